// Current technician/request selection
use super::service_request::ServiceRequest;
use super::technician::Technician;
use serde::Serialize;

/// A selected entity and its row position in the loaded dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selected<T> {
    pub index: usize,
    pub entity: T,
}

impl<T> Selected<T> {
    pub fn new(index: usize, entity: T) -> Self {
        Self { index, entity }
    }
}

/// At most one technician and at most one service request.
///
/// Identity is the dataset position, so rows without an id or with a
/// repeated id are still told apart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectionState {
    pub technician: Option<Selected<Technician>>,
    pub request: Option<Selected<ServiceRequest>>,
}

impl SelectionState {
    /// Replace the technician, returning the previous one.
    pub fn select_technician(
        &mut self,
        technician: Selected<Technician>,
    ) -> Option<Selected<Technician>> {
        self.technician.replace(technician)
    }

    /// Replace the request, returning the previous one.
    pub fn select_request(
        &mut self,
        request: Selected<ServiceRequest>,
    ) -> Option<Selected<ServiceRequest>> {
        self.request.replace(request)
    }

    pub fn clear(&mut self) {
        self.technician = None;
        self.request = None;
    }

    pub fn is_technician_selected(&self, index: usize) -> bool {
        self.technician.as_ref().is_some_and(|s| s.index == index)
    }

    pub fn is_request_selected(&self, index: usize) -> bool {
        self.request.as_ref().is_some_and(|s| s.index == index)
    }
}
