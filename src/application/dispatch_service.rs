// Dispatch service - Use cases over the shared board, with async route fetching
use crate::application::dispatch_controller::{DispatchController, DispatchError, MapView};
use crate::application::marker_renderer::MarkerHandle;
use crate::application::routing_provider::RoutingProvider;
use crate::application::sidebar_renderer::SidebarView;
use crate::domain::route::{ActiveRoute, RouteRequest};
use crate::domain::service_request::PriorityFilter;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Result of a selection: the new map state plus the routing task, if one
/// was started. Callers may await the task or drop the handle to detach it.
pub struct Interaction {
    pub map: MapView,
    pub routing: Option<JoinHandle<()>>,
}

#[derive(Clone)]
pub struct DispatchService {
    controller: Arc<Mutex<DispatchController>>,
    router: Arc<dyn RoutingProvider>,
}

impl DispatchService {
    pub fn new(controller: DispatchController, router: Arc<dyn RoutingProvider>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            router,
        }
    }

    pub async fn map_view(&self) -> MapView {
        self.controller.lock().await.map_view()
    }

    pub async fn sidebar(&self) -> SidebarView {
        self.controller.lock().await.sidebar().clone()
    }

    pub async fn active_route(&self) -> Option<ActiveRoute> {
        self.controller.lock().await.route().cloned()
    }

    pub async fn popup_html(&self, handle: MarkerHandle) -> Option<String> {
        let controller = self.controller.lock().await;
        controller.markers().marker(handle).map(|m| m.popup.to_html())
    }

    pub async fn set_filter(&self, filter: PriorityFilter) -> SidebarView {
        self.controller.lock().await.set_filter(filter).clone()
    }

    pub async fn click_marker(&self, handle: MarkerHandle) -> Interaction {
        let mut controller = self.controller.lock().await;
        let route_request = controller.click_marker(handle);
        self.finish(controller.map_view(), route_request)
    }

    pub async fn press_popup_button(&self, handle: MarkerHandle) -> Interaction {
        let mut controller = self.controller.lock().await;
        let route_request = controller.press_popup_button(handle);
        self.finish(controller.map_view(), route_request)
    }

    pub async fn click_technician_item(&self, id: &str) -> Result<Interaction, DispatchError> {
        let mut controller = self.controller.lock().await;
        let route_request = controller.click_technician_item(id)?;
        Ok(self.finish(controller.map_view(), route_request))
    }

    pub async fn click_request_item(&self, id: &str) -> Result<Interaction, DispatchError> {
        let mut controller = self.controller.lock().await;
        let route_request = controller.click_request_item(id)?;
        Ok(self.finish(controller.map_view(), route_request))
    }

    /// Redraw every marker; handles issued before this stop resolving.
    pub async fn redraw_markers(&self) -> MapView {
        let mut controller = self.controller.lock().await;
        controller.rerender_markers();
        controller.map_view()
    }

    pub async fn clear(&self) -> MapView {
        let mut controller = self.controller.lock().await;
        controller.clear();
        controller.map_view()
    }

    fn finish(&self, map: MapView, route_request: Option<RouteRequest>) -> Interaction {
        Interaction {
            map,
            routing: route_request.map(|request| self.spawn_routing(request)),
        }
    }

    /// The provider is awaited without holding the board lock.
    fn spawn_routing(&self, request: RouteRequest) -> JoinHandle<()> {
        let controller = self.controller.clone();
        let router = self.router.clone();

        tokio::spawn(async move {
            let result = router.find_routes(&request).await;
            let applied = controller
                .lock()
                .await
                .apply_route_result(request.generation, result);
            tracing::debug!(
                "Route generation {} finished (drawn: {})",
                request.generation,
                applied
            );
        })
    }
}
