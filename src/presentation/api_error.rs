// JSON error responses
use crate::application::dispatch_controller::DispatchError;
use crate::domain::service_request::UnknownPriorityFilter;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    NotFound(#[from] DispatchError),
    #[error(transparent)]
    BadFilter(#[from] UnknownPriorityFilter),
    #[error("marker {0} not found")]
    UnknownMarker(u64),
    #[error("invalid path: {0}")]
    BadPath(#[from] PathRejection),
    #[error("invalid request body: {0}")]
    BadBody(#[from] JsonRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) | ApiError::UnknownMarker(_) => StatusCode::NOT_FOUND,
            ApiError::BadFilter(_) => StatusCode::BAD_REQUEST,
            ApiError::BadPath(rejection) => rejection.status(),
            ApiError::BadBody(rejection) => rejection.status(),
        };
        tracing::debug!("Request rejected ({}): {}", status, self);
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
