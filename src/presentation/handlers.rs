// HTTP request handlers
use crate::application::dispatch_controller::MapView;
use crate::application::dispatch_service::Interaction;
use crate::application::marker_renderer::MarkerHandle;
use crate::application::sidebar_renderer::SidebarView;
use crate::domain::route::ActiveRoute;
use crate::domain::service_request::PriorityFilter;
use crate::presentation::api_error::ApiError;
use crate::presentation::app_state::AppState;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequestParts, Path, State},
    http::request::Parts,
    response::Html,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct FilterBody {
    pub priority: String,
}

/// `:handle` path segment; malformed handles answer with a JSON error.
pub struct MarkerPath(pub MarkerHandle);

#[async_trait]
impl<S> FromRequestParts<S> for MarkerPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(handle) = Path::<u64>::from_request_parts(parts, state).await?;
        Ok(MarkerPath(MarkerHandle(handle)))
    }
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/map", get(get_map))
        .route("/sidebar", get(get_sidebar))
        .route("/sidebar/filter", put(set_filter))
        .route("/sidebar/technicians/:id/click", post(click_technician_item))
        .route("/sidebar/requests/:id/click", post(click_request_item))
        .route("/markers/redraw", post(redraw_markers))
        .route("/markers/:handle/click", post(click_marker))
        .route("/markers/:handle/popup-button", post(press_popup_button))
        .route("/markers/:handle/popup", get(get_popup))
        .route("/route", get(get_route))
        .route("/route/clear", post(clear_route))
        .with_state(state)
}

/// Routing continues in the background; the client polls `/route` or `/map`.
fn detach(interaction: Interaction) -> Json<MapView> {
    drop(interaction.routing);
    Json(interaction.map)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_map(State(state): State<Arc<AppState>>) -> Json<MapView> {
    Json(state.dispatch_service.map_view().await)
}

pub async fn get_sidebar(State(state): State<Arc<AppState>>) -> Json<SidebarView> {
    Json(state.dispatch_service.sidebar().await)
}

/// Priority dropdown change
pub async fn set_filter(
    State(state): State<Arc<AppState>>,
    body: Result<Json<FilterBody>, JsonRejection>,
) -> Result<Json<SidebarView>, ApiError> {
    let Json(body) = body?;
    let filter: PriorityFilter = body.priority.parse()?;
    Ok(Json(state.dispatch_service.set_filter(filter).await))
}

pub async fn click_technician_item(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MapView>, ApiError> {
    let interaction = state.dispatch_service.click_technician_item(&id).await?;
    Ok(detach(interaction))
}

pub async fn click_request_item(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MapView>, ApiError> {
    let interaction = state.dispatch_service.click_request_item(&id).await?;
    Ok(detach(interaction))
}

pub async fn redraw_markers(State(state): State<Arc<AppState>>) -> Json<MapView> {
    Json(state.dispatch_service.redraw_markers().await)
}

/// Stale handles answer with the unchanged map
pub async fn click_marker(
    MarkerPath(handle): MarkerPath,
    State(state): State<Arc<AppState>>,
) -> Json<MapView> {
    detach(state.dispatch_service.click_marker(handle).await)
}

pub async fn press_popup_button(
    MarkerPath(handle): MarkerPath,
    State(state): State<Arc<AppState>>,
) -> Json<MapView> {
    detach(state.dispatch_service.press_popup_button(handle).await)
}

pub async fn get_popup(
    MarkerPath(handle): MarkerPath,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>, ApiError> {
    state
        .dispatch_service
        .popup_html(handle)
        .await
        .map(Html)
        .ok_or(ApiError::UnknownMarker(handle.0))
}

pub async fn get_route(State(state): State<Arc<AppState>>) -> Json<Option<ActiveRoute>> {
    Json(state.dispatch_service.active_route().await)
}

/// "Clear Route" button
pub async fn clear_route(State(state): State<Arc<AppState>>) -> Json<MapView> {
    Json(state.dispatch_service.clear().await)
}
