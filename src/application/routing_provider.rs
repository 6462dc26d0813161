// Routing provider trait for driving directions
use crate::domain::route::{Route, RouteRequest};
use async_trait::async_trait;

#[async_trait]
pub trait RoutingProvider: Send + Sync {
    /// Routes between the request's two waypoints, best first.
    /// An empty list means no route exists.
    async fn find_routes(&self, request: &RouteRequest) -> anyhow::Result<Vec<Route>>;
}
