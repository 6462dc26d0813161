// Dispatch controller - Owns the board state and applies user interactions
use crate::application::data_loader::Dataset;
use crate::application::marker_renderer::{EntityKey, MarkerHandle, MarkerLayers, MarkerRenderer};
use crate::application::sidebar_renderer::{render_sidebar, SidebarView};
use crate::domain::geo::{LatLng, Viewport};
use crate::domain::route::{ActiveRoute, LineStyle, Route, RouteRequest, TravelProfile};
use crate::domain::selection::{Selected, SelectionState};
use crate::domain::service_request::{PriorityFilter, ServiceRequest};
use crate::domain::technician::Technician;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("technician '{0}' not found")]
    UnknownTechnician(String),
    #[error("service request '{0}' not found")]
    UnknownRequest(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

/// Fixed presentation parameters of the board
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub tile_layer: TileLayer,
    pub initial_center: LatLng,
    pub initial_zoom: u8,
    /// Zoom used when a sidebar item re-centres the map
    pub focus_zoom: u8,
    pub fit_padding: [u32; 2],
    pub line_style: LineStyle,
    pub profile: TravelProfile,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            tile_layer: TileLayer {
                url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
                attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_string(),
            },
            initial_center: LatLng::new(0.3475, 32.5822),
            initial_zoom: 12,
            focus_zoom: 15,
            fit_padding: [50, 50],
            line_style: LineStyle::default(),
            profile: TravelProfile::Driving,
        }
    }
}

/// Snapshot of everything the map shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub tile_layer: TileLayer,
    pub viewport: Viewport,
    pub markers: MarkerLayers,
    pub open_popup: Option<MarkerHandle>,
    pub route: Option<ActiveRoute>,
}

pub struct DispatchController {
    dataset: Dataset,
    options: MapOptions,
    markers: MarkerRenderer,
    sidebar: SidebarView,
    filter: PriorityFilter,
    selection: SelectionState,
    viewport: Viewport,
    open_popup: Option<MarkerHandle>,
    route: Option<ActiveRoute>,
    generation: u64,
}

impl DispatchController {
    pub fn new(dataset: Dataset, options: MapOptions) -> Self {
        let selection = SelectionState::default();
        let filter = PriorityFilter::All;
        let sidebar = render_sidebar(&dataset, filter, &selection);
        let mut markers = MarkerRenderer::new();
        markers.render(&dataset);
        let viewport = Viewport::Center {
            center: options.initial_center,
            zoom: options.initial_zoom,
        };

        Self {
            dataset,
            options,
            markers,
            sidebar,
            filter,
            selection,
            viewport,
            open_popup: None,
            route: None,
            generation: 0,
        }
    }

    pub fn sidebar(&self) -> &SidebarView {
        &self.sidebar
    }

    pub fn markers(&self) -> &MarkerRenderer {
        &self.markers
    }

    pub fn route(&self) -> Option<&ActiveRoute> {
        self.route.as_ref()
    }

    pub fn map_view(&self) -> MapView {
        MapView {
            tile_layer: self.options.tile_layer.clone(),
            viewport: self.viewport.clone(),
            markers: self.markers.layers().clone(),
            open_popup: self.open_popup,
            route: self.route.clone(),
        }
    }

    /// Redraw every marker. Previously issued handles stop resolving.
    pub fn rerender_markers(&mut self) -> &MarkerLayers {
        self.open_popup = None;
        self.markers.render(&self.dataset)
    }

    pub fn set_filter(&mut self, filter: PriorityFilter) -> &SidebarView {
        self.filter = filter;
        self.sidebar = render_sidebar(&self.dataset, self.filter, &self.selection);
        &self.sidebar
    }

    pub fn select_technician(&mut self, technician: Selected<Technician>) -> Option<RouteRequest> {
        if let Some(previous) = &self.selection.technician {
            self.sidebar.mark_technician(previous.index, false);
        }
        self.sidebar.mark_technician(technician.index, true);
        tracing::debug!(
            "Selected technician: {} (row {})",
            technician.entity.display_name(),
            technician.index
        );
        self.selection.select_technician(technician);
        self.reconcile_popup();
        self.draw_route_if_ready()
    }

    pub fn select_service_request(
        &mut self,
        request: Selected<ServiceRequest>,
    ) -> Option<RouteRequest> {
        if let Some(previous) = &self.selection.request {
            self.sidebar.mark_request(previous.index, false);
        }
        self.sidebar.mark_request(request.index, true);
        tracing::debug!(
            "Selected service request: {} (row {})",
            request
                .entity
                .customer_name()
                .unwrap_or_else(|| request.entity.id.clone()),
            request.index
        );
        self.selection.select_request(request);
        self.reconcile_popup();
        self.draw_route_if_ready()
    }

    /// Select the marker's entity and open its popup. Unknown handles are ignored.
    pub fn click_marker(&mut self, handle: MarkerHandle) -> Option<RouteRequest> {
        let route_request = self.select_marker_entity(handle)?;
        self.open_popup = Some(handle);
        route_request
    }

    /// Select the marker's entity and close its popup.
    pub fn press_popup_button(&mut self, handle: MarkerHandle) -> Option<RouteRequest> {
        let route_request = self.select_marker_entity(handle)?;
        self.open_popup = None;
        route_request
    }

    /// Outer `None`: handle did not resolve.
    fn select_marker_entity(&mut self, handle: MarkerHandle) -> Option<Option<RouteRequest>> {
        let Some(key) = self.markers.resolve(handle) else {
            tracing::debug!("Ignoring click on stale marker {:?}", handle);
            return None;
        };
        let route_request = match key {
            EntityKey::Technician(idx) => {
                let tech = self.dataset.technician_at(idx)?;
                self.select_technician(tech)
            }
            EntityKey::Request(idx) => {
                let request = self.dataset.request_at(idx)?;
                self.select_service_request(request)
            }
        };
        Some(route_request)
    }

    /// Sidebar click: select and re-centre on the technician.
    pub fn click_technician_item(
        &mut self,
        id: &str,
    ) -> Result<Option<RouteRequest>, DispatchError> {
        let tech = self
            .dataset
            .find_technician(id)
            .ok_or_else(|| DispatchError::UnknownTechnician(id.to_string()))?;
        let location = tech.entity.location();
        let route_request = self.select_technician(tech);
        self.focus(location);
        Ok(route_request)
    }

    /// Sidebar click: select and re-centre on the request.
    pub fn click_request_item(
        &mut self,
        id: &str,
    ) -> Result<Option<RouteRequest>, DispatchError> {
        let request = self
            .dataset
            .find_request(id)
            .ok_or_else(|| DispatchError::UnknownRequest(id.to_string()))?;
        let location = request.entity.location();
        let route_request = self.select_service_request(request);
        self.focus(location);
        Ok(route_request)
    }

    fn focus(&mut self, location: Option<LatLng>) {
        if let Some(center) = location {
            self.viewport = Viewport::Center {
                center,
                zoom: self.options.focus_zoom,
            };
        }
    }

    /// Drop both selections and any drawn route.
    pub fn clear(&mut self) {
        if let Some(tech) = &self.selection.technician {
            self.sidebar.mark_technician(tech.index, false);
        }
        if let Some(request) = &self.selection.request {
            self.sidebar.mark_request(request.index, false);
        }
        self.selection.clear();
        self.route = None;
        self.open_popup = None;
        tracing::debug!("Cleared selection and route");
    }

    /// With both selections present, replace the active route with a pending
    /// one and return the request the provider should answer.
    pub fn draw_route_if_ready(&mut self) -> Option<RouteRequest> {
        let (Some(tech), Some(request)) = (&self.selection.technician, &self.selection.request)
        else {
            return None;
        };
        let (tech, request) = (&tech.entity, &request.entity);

        self.route = None;
        let (Some(from), Some(to)) = (tech.location(), request.location()) else {
            tracing::debug!(
                "Not routing {:?} -> {}: missing coordinates",
                tech.id,
                request.id
            );
            return None;
        };

        self.generation += 1;
        let active = ActiveRoute {
            generation: self.generation,
            technician_id: tech.id.clone(),
            request_id: request.id.clone(),
            from,
            to,
            style: self.options.line_style.clone(),
            route: None,
        };
        tracing::debug!(
            "Routing {:?} -> {} (generation {})",
            active.technician_id,
            active.request_id,
            active.generation
        );
        self.route = Some(active);

        Some(RouteRequest {
            generation: self.generation,
            from,
            to,
            profile: self.options.profile,
        })
    }

    /// Apply a provider answer. Answers for superseded or cleared routes,
    /// errors and empty results leave the map untouched. Returns whether the
    /// route was drawn.
    pub fn apply_route_result(
        &mut self,
        generation: u64,
        result: anyhow::Result<Vec<Route>>,
    ) -> bool {
        let Some(active) = self.route.as_mut().filter(|a| a.generation == generation) else {
            tracing::debug!("Discarding stale route result (generation {})", generation);
            return false;
        };

        let route = match result {
            Ok(routes) => match routes.into_iter().next() {
                Some(route) => route,
                None => {
                    tracing::debug!("Routing provider found no route (generation {})", generation);
                    return false;
                }
            },
            Err(e) => {
                tracing::warn!("Routing failed (generation {}): {:#}", generation, e);
                return false;
            }
        };

        if let Some(bounds) = route.bounds() {
            self.viewport = Viewport::FitBounds {
                bounds,
                padding: self.options.fit_padding,
            };
        }
        active.route = Some(route);
        true
    }

    /// Open popup only ever belongs to a selected entity.
    fn reconcile_popup(&mut self) {
        let Some(handle) = self.open_popup else {
            return;
        };
        let still_selected = match self.markers.resolve(handle) {
            Some(EntityKey::Technician(idx)) => self.selection.is_technician_selected(idx),
            Some(EntityKey::Request(idx)) => self.selection.is_request_selected(idx),
            None => false,
        };
        if !still_selected {
            self.open_popup = None;
        }
    }
}

#[cfg(test)]
impl DispatchController {
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn open_popup(&self) -> Option<MarkerHandle> {
        self.open_popup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::data_loader::parse_dataset;
    use crate::domain::geo::Bounds;
    use crate::domain::service_request::Priority;

    const CSV: &str = "\
Service Request ID,Customer Name,Customer Address,Appliance Type,Problem Description,Severity/Priority,Status,Scheduled Date/Time,Contact Number,Latitude,Longitude
SR001,Tech One,,,,,,,,0.34,32.58
SR002,Tech Two,,,,,,,,0.35,32.59
SR003,Tech Three,,,,,,,,,
SR004,Aisha K,Plot 4,Washer,Leaking,High,Pending,,,0.31,32.57
SR005,Brian O,Plot 9,Fridge,Noisy,Medium,Assigned,,,0.32,32.59
SR006,Carol M,Ntinda,Oven,No heat,High,Pending,,,0.33,32.60
";

    fn controller() -> DispatchController {
        DispatchController::new(parse_dataset(CSV, 3).unwrap(), MapOptions::default())
    }

    fn tech(c: &DispatchController, id: &str) -> Selected<Technician> {
        c.dataset().find_technician(id).unwrap()
    }

    fn request(c: &DispatchController, id: &str) -> Selected<ServiceRequest> {
        c.dataset().find_request(id).unwrap()
    }

    fn sample_route() -> Route {
        Route {
            coordinates: vec![LatLng::new(0.34, 32.58), LatLng::new(0.31, 32.57)],
            distance_m: Some(4100.0),
            duration_s: Some(540.0),
        }
    }

    /// Incremental highlighting must agree with a full re-render.
    fn assert_sidebar_matches_selection(c: &DispatchController) {
        let techs: Vec<_> = c.sidebar().selected_technicians().map(|i| i.index).collect();
        let expected_tech: Vec<_> = c.selection().technician.iter().map(|t| t.index).collect();
        assert_eq!(techs, expected_tech);

        let reqs: Vec<_> = c.sidebar().selected_requests().map(|i| i.index).collect();
        let expected_req: Vec<_> = c
            .selection()
            .request
            .iter()
            .map(|r| r.index)
            .filter(|idx| c.sidebar().requests.iter().any(|i| i.index == *idx))
            .collect();
        assert_eq!(reqs, expected_req);

        let rerendered = render_sidebar(c.dataset(), c.sidebar().filter, c.selection());
        assert_eq!(c.sidebar(), &rerendered);
    }

    #[test]
    fn test_single_selection_never_routes() {
        let mut c = controller();
        assert!(c.select_technician(tech(&c, "SR001")).is_none());
        assert!(c.route().is_none());

        let mut c = controller();
        assert!(c.select_service_request(request(&c, "SR004")).is_none());
        assert!(c.route().is_none());
    }

    #[test]
    fn test_switching_technician_keeps_request_and_reroutes_once() {
        let mut c = controller();
        assert!(c.select_technician(tech(&c, "SR001")).is_none());
        let first = c.select_service_request(request(&c, "SR004")).unwrap();
        assert!(c.apply_route_result(first.generation, Ok(vec![sample_route()])));

        let second = c.select_technician(tech(&c, "SR002")).unwrap();
        assert_eq!(second.from, LatLng::new(0.35, 32.59));
        assert_eq!(second.to, LatLng::new(0.31, 32.57));
        assert_eq!(second.profile, TravelProfile::Driving);
        assert!(second.generation > first.generation);

        let active = c.route().unwrap();
        assert_eq!(active.technician_id.as_deref(), Some("SR002"));
        assert_eq!(active.request_id, "SR004");
        assert!(active.route.is_none(), "T1 -> R1 route must be discarded");
        assert_eq!(c.selection().request.as_ref().unwrap().entity.id, "SR004");
        assert_sidebar_matches_selection(&c);
    }

    #[test]
    fn test_route_result_fits_viewport() {
        let mut c = controller();
        c.select_technician(tech(&c, "SR001"));
        let req = c.select_service_request(request(&c, "SR004")).unwrap();
        assert!(c.apply_route_result(req.generation, Ok(vec![sample_route()])));

        assert_eq!(
            c.viewport(),
            &Viewport::FitBounds {
                bounds: Bounds {
                    south_west: LatLng::new(0.31, 32.57),
                    north_east: LatLng::new(0.34, 32.58),
                },
                padding: [50, 50],
            }
        );
        assert_eq!(c.route().unwrap().style, LineStyle::default());
    }

    #[test]
    fn test_stale_route_result_is_discarded() {
        let mut c = controller();
        c.select_technician(tech(&c, "SR001"));
        let old = c.select_service_request(request(&c, "SR004")).unwrap();
        let new = c.select_service_request(request(&c, "SR005")).unwrap();

        assert!(!c.apply_route_result(old.generation, Ok(vec![sample_route()])));
        assert!(c.route().unwrap().route.is_none());
        assert!(c.apply_route_result(new.generation, Ok(vec![sample_route()])));
        assert_eq!(c.route().unwrap().request_id, "SR005");
    }

    #[test]
    fn test_failed_or_empty_route_leaves_map_unchanged() {
        let mut c = controller();
        c.select_technician(tech(&c, "SR001"));
        let req = c.select_service_request(request(&c, "SR004")).unwrap();
        let before = c.viewport().clone();

        assert!(!c.apply_route_result(req.generation, Err(anyhow::anyhow!("timeout"))));
        assert!(!c.apply_route_result(req.generation, Ok(vec![])));
        assert_eq!(c.viewport(), &before);
        assert!(c.route().unwrap().route.is_none());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut c = controller();
        c.select_technician(tech(&c, "SR001"));
        let req = c.select_service_request(request(&c, "SR004")).unwrap();
        c.apply_route_result(req.generation, Ok(vec![sample_route()]));

        c.clear();
        assert_eq!(c.selection(), &SelectionState::default());
        assert!(c.route().is_none());
        assert!(c.open_popup().is_none());
        assert_eq!(c.sidebar().selected_requests().count(), 0);
        assert_eq!(c.sidebar().selected_technicians().count(), 0);

        // late answer after clear must not resurrect the route
        assert!(!c.apply_route_result(req.generation, Ok(vec![sample_route()])));
        assert!(c.route().is_none());

        c.clear();
        assert_eq!(c.selection(), &SelectionState::default());
    }

    #[test]
    fn test_technician_without_coordinates_skips_routing() {
        let mut c = controller();
        c.select_technician(tech(&c, "SR003"));
        assert!(c.select_service_request(request(&c, "SR004")).is_none());
        assert!(c.route().is_none());
    }

    #[test]
    fn test_marker_click_opens_popup_and_button_closes_it() {
        let mut c = controller();
        let handle = c.markers().layers().requests[0].handle;

        assert!(c.click_marker(handle).is_none());
        assert_eq!(c.open_popup(), Some(handle));
        assert_eq!(c.selection().request.as_ref().unwrap().entity.id, "SR004");

        c.press_popup_button(handle);
        assert_eq!(c.open_popup(), None);
        assert_eq!(c.selection().request.as_ref().unwrap().entity.id, "SR004");
        assert_sidebar_matches_selection(&c);
    }

    #[test]
    fn test_popup_closes_when_entity_deselected() {
        let mut c = controller();
        let first = c.markers().layers().requests[0].handle;
        c.click_marker(first);
        c.select_service_request(request(&c, "SR005"));
        assert_eq!(c.open_popup(), None);

        let tech_handle = c.markers().layers().technicians[0].handle;
        c.click_marker(tech_handle);
        // selecting a request keeps the technician popup
        c.select_service_request(request(&c, "SR006"));
        assert_eq!(c.open_popup(), Some(tech_handle));
    }

    #[test]
    fn test_stale_marker_handle_is_ignored() {
        let mut c = controller();
        let stale = c.markers().layers().requests[0].handle;
        c.rerender_markers();

        assert!(c.click_marker(stale).is_none());
        assert!(c.selection().request.is_none());
        assert!(c.open_popup().is_none());
    }

    #[test]
    fn test_sidebar_click_recentres() {
        let mut c = controller();
        c.click_request_item("SR005").unwrap();
        assert_eq!(
            c.viewport(),
            &Viewport::Center {
                center: LatLng::new(0.32, 32.59),
                zoom: 15
            }
        );

        let before = c.viewport().clone();
        c.click_technician_item("SR003").unwrap();
        assert_eq!(c.viewport(), &before);

        assert_eq!(
            c.click_request_item("SR404"),
            Err(DispatchError::UnknownRequest("SR404".to_string()))
        );
    }

    #[test]
    fn test_filter_keeps_selection_highlight() {
        let mut c = controller();
        c.click_request_item("SR006").unwrap();

        let view = c.set_filter(PriorityFilter::Only(Priority::Medium));
        assert_eq!(view.pending_count, 1);
        assert_eq!(view.selected_requests().count(), 0);

        let view = c.set_filter(PriorityFilter::Only(Priority::High));
        let selected: Vec<_> = view.selected_requests().collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].entity_id.as_deref(), Some("SR006"));
        assert_sidebar_matches_selection(&c);
    }

    #[test]
    fn test_technician_without_id_is_highlighted_via_marker() {
        let csv = CSV.replacen("SR002,Tech Two", ",Tech Two", 1);
        let mut c = DispatchController::new(parse_dataset(&csv, 3).unwrap(), MapOptions::default());
        let handle = c.markers().layers().technicians[1].handle;
        assert_eq!(c.markers().layers().technicians[1].entity_id, None);

        c.click_marker(handle);
        assert_eq!(c.selection().technician.as_ref().map(|t| t.index), Some(1));
        let selected: Vec<_> = c.sidebar().selected_technicians().collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].label, "Tech Two (Available)");
        assert_sidebar_matches_selection(&c);

        c.click_technician_item("SR001").unwrap();
        assert_eq!(c.sidebar().selected_technicians().count(), 1);
        assert_sidebar_matches_selection(&c);
    }

    #[test]
    fn test_duplicate_request_ids_highlight_clicked_row() {
        let csv = format!("{CSV}SR005,Dan L,Kireka,Dryer,Smells,Low,Pending,,,0.36,32.61\n");
        let mut c = DispatchController::new(parse_dataset(&csv, 3).unwrap(), MapOptions::default());
        let second = c.markers().layers().requests[3].handle;

        c.click_marker(second);
        let selected = c.selection().request.as_ref().unwrap();
        assert_eq!(selected.index, 3);
        assert_eq!(selected.entity.customer_name().as_deref(), Some("Dan L"));
        let flags: Vec<_> = c.sidebar().requests.iter().map(|i| i.selected).collect();
        assert_eq!(flags, vec![false, false, false, true]);
        assert_sidebar_matches_selection(&c);

        let flags: Vec<_> = c
            .set_filter(PriorityFilter::All)
            .requests
            .iter()
            .map(|i| i.selected)
            .collect();
        assert_eq!(flags, vec![false, false, false, true]);

        // the sidebar can only address the first row with a repeated id
        c.click_request_item("SR005").unwrap();
        let flags: Vec<_> = c.sidebar().requests.iter().map(|i| i.selected).collect();
        assert_eq!(flags, vec![false, true, false, false]);
        assert_sidebar_matches_selection(&c);
    }

    #[test]
    fn test_rerender_closes_popup_and_keeps_highlight() {
        let mut c = controller();
        let handle = c.markers().layers().requests[0].handle;
        c.click_marker(handle);

        let layers = c.rerender_markers();
        assert_eq!(layers.requests.len(), 3);
        assert_ne!(layers.requests[0].handle, handle);
        assert!(c.open_popup().is_none());
        assert_eq!(c.selection().request.as_ref().map(|r| r.index), Some(0));
        assert_sidebar_matches_selection(&c);
    }

    #[test]
    fn test_map_view_snapshot() {
        let c = controller();
        let view = c.map_view();
        assert_eq!(view.markers.technicians.len(), 2);
        assert_eq!(view.markers.requests.len(), 3);
        assert_eq!(
            view.viewport,
            Viewport::Center {
                center: LatLng::new(0.3475, 32.5822),
                zoom: 12
            }
        );
        assert!(view.route.is_none());
    }
}
