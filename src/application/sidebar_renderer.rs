// Sidebar renderer - Filterable technician and request lists
use crate::application::data_loader::Dataset;
use crate::domain::selection::SelectionState;
use crate::domain::service_request::{columns, PriorityFilter, ServiceRequest};
use crate::domain::technician::Technician;
use serde::Serialize;

pub const SELECTED_CLASS: &str = "selected";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    /// Row position in the dataset's technician or request list
    pub index: usize,
    /// Value of the item's `data-*-id` attribute
    pub entity_id: Option<String>,
    pub label: String,
    pub classes: Vec<String>,
    pub selected: bool,
}

impl ListItem {
    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        self.classes.retain(|c| c != SELECTED_CLASS);
        if selected {
            self.classes.push(SELECTED_CLASS.to_string());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SidebarView {
    pub filter: PriorityFilter,
    pub pending_count: usize,
    pub requests: Vec<ListItem>,
    pub technicians: Vec<ListItem>,
}

impl SidebarView {
    /// Toggle the `selected` flag of the request item for this row, if listed.
    pub fn mark_request(&mut self, index: usize, selected: bool) {
        if let Some(item) = find_item(&mut self.requests, index) {
            item.set_selected(selected);
        }
    }

    pub fn mark_technician(&mut self, index: usize, selected: bool) {
        if let Some(item) = find_item(&mut self.technicians, index) {
            item.set_selected(selected);
        }
    }
}

#[cfg(test)]
impl SidebarView {
    pub fn selected_requests(&self) -> impl Iterator<Item = &ListItem> {
        self.requests.iter().filter(|i| i.selected)
    }

    pub fn selected_technicians(&self) -> impl Iterator<Item = &ListItem> {
        self.technicians.iter().filter(|i| i.selected)
    }
}

fn find_item(items: &mut [ListItem], index: usize) -> Option<&mut ListItem> {
    items.iter_mut().find(|item| item.index == index)
}

/// Requests in dataset order that pass the filter, with their row positions
pub fn filter_requests(
    requests: &[ServiceRequest],
    filter: PriorityFilter,
) -> Vec<(usize, &ServiceRequest)> {
    requests
        .iter()
        .enumerate()
        .filter(|(_, r)| filter.matches(r))
        .collect()
}

/// Rebuild both lists from scratch.
pub fn render_sidebar(
    dataset: &Dataset,
    filter: PriorityFilter,
    selection: &SelectionState,
) -> SidebarView {
    let filtered = filter_requests(&dataset.requests, filter);

    let requests = filtered
        .iter()
        .map(|&(idx, request)| request_item(idx, request, selection.is_request_selected(idx)))
        .collect();

    let technicians = dataset
        .technicians
        .iter()
        .enumerate()
        .map(|(idx, tech)| technician_item(idx, tech, selection.is_technician_selected(idx)))
        .collect();

    SidebarView {
        filter,
        pending_count: filtered.len(),
        requests,
        technicians,
    }
}

fn display(value: Option<String>) -> String {
    value.unwrap_or_else(|| "null".to_string())
}

fn request_item(index: usize, request: &ServiceRequest, selected: bool) -> ListItem {
    let priority = request.priority_label();
    let label = format!(
        "{} - {} ({}) - Priority: {}",
        request.id,
        display(request.customer_name()),
        display(request.field(columns::APPLIANCE_TYPE)),
        display(priority.clone())
    );
    let mut item = ListItem {
        index,
        entity_id: Some(request.id.clone()),
        label,
        classes: vec![format!(
            "priority-{}",
            priority.unwrap_or_default().to_lowercase()
        )],
        selected: false,
    };
    item.set_selected(selected);
    item
}

fn technician_item(index: usize, tech: &Technician, selected: bool) -> ListItem {
    let mut item = ListItem {
        index,
        entity_id: tech.id.clone(),
        label: format!("{} ({})", display(tech.name.clone()), tech.availability),
        classes: Vec::new(),
        selected: false,
    };
    item.set_selected(selected);
    item
}
