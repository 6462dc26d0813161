// Marker renderer - Projects the dataset onto map marker layers
use crate::application::data_loader::Dataset;
use crate::domain::geo::LatLng;
use crate::domain::service_request::{columns, Priority, ServiceRequest};
use crate::domain::technician::Technician;
use serde::Serialize;
use std::collections::HashMap;

pub const SELECT_BUTTON_LABEL: &str = "Select for Route";

/// Opaque marker id, valid until the next render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MarkerHandle(pub u64);

/// Position of the entity in the loaded dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Technician(usize),
    Request(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Icon {
    pub class_name: String,
    pub html: String,
    pub size: [u32; 2],
    pub anchor: [i32; 2],
    pub popup_anchor: [i32; 2],
}

impl Icon {
    pub fn technician() -> Self {
        Self {
            class_name: "technician-icon".to_string(),
            html: "<i class=\"fas fa-wrench\"></i>".to_string(),
            size: [28, 28],
            anchor: [14, 28],
            popup_anchor: [0, -28],
        }
    }

    pub fn request(priority: Priority) -> Self {
        let class_name = match priority {
            Priority::High => "request-marker-high",
            Priority::Medium => "request-marker-medium",
            Priority::Low => "request-marker-low",
        };
        Self {
            class_name: class_name.to_string(),
            html: String::new(),
            size: [20, 20],
            anchor: [10, 10],
            popup_anchor: [0, -10],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupLine {
    pub label: String,
    pub value: String,
    pub emphasis: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupButton {
    /// e.g. `data-request-id`
    pub data_attribute: String,
    pub entity_id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub title: String,
    pub lines: Vec<PopupLine>,
    pub button: PopupButton,
}

impl Popup {
    pub fn to_html(&self) -> String {
        let mut html = format!("<b>{}</b><br>", escape_html(&self.title));
        let lines: Vec<String> = self
            .lines
            .iter()
            .map(|line| {
                if line.emphasis {
                    format!("{}: <b>{}</b>", escape_html(&line.label), escape_html(&line.value))
                } else {
                    format!("{}: {}", escape_html(&line.label), escape_html(&line.value))
                }
            })
            .collect();
        html.push_str(&lines.join("<br>"));
        html.push_str(&format!(
            "<br><br><button {}=\"{}\" class=\"assign-btn\">{}</button>",
            self.button.data_attribute,
            escape_html(&self.button.entity_id),
            escape_html(&self.button.label)
        ));
        html
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Technician,
    Request,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub handle: MarkerHandle,
    pub kind: MarkerKind,
    pub entity_id: Option<String>,
    pub position: LatLng,
    pub icon: Icon,
    pub popup: Popup,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerLayers {
    pub requests: Vec<Marker>,
    pub technicians: Vec<Marker>,
}

/// Owns the current markers and the handle → entity side table
#[derive(Debug, Default)]
pub struct MarkerRenderer {
    next_handle: u64,
    entities: HashMap<MarkerHandle, EntityKey>,
    layers: MarkerLayers,
}

impl MarkerRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full redraw: every previous marker and handle is dropped.
    pub fn render(&mut self, dataset: &Dataset) -> &MarkerLayers {
        self.entities.clear();
        self.layers = MarkerLayers::default();

        for (idx, request) in dataset.requests.iter().enumerate() {
            let Some(position) = request.location() else {
                continue;
            };
            let handle = self.issue(EntityKey::Request(idx));
            self.layers.requests.push(Marker {
                handle,
                kind: MarkerKind::Request,
                entity_id: Some(request.id.clone()),
                position,
                icon: Icon::request(request.priority()),
                popup: request_popup(request),
            });
        }

        for (idx, tech) in dataset.technicians.iter().enumerate() {
            let Some(position) = tech.location() else {
                continue;
            };
            let handle = self.issue(EntityKey::Technician(idx));
            self.layers.technicians.push(Marker {
                handle,
                kind: MarkerKind::Technician,
                entity_id: tech.id.clone(),
                position,
                icon: Icon::technician(),
                popup: technician_popup(tech),
            });
        }

        tracing::debug!(
            "Rendered {} request markers and {} technician markers",
            self.layers.requests.len(),
            self.layers.technicians.len()
        );
        &self.layers
    }

    fn issue(&mut self, key: EntityKey) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.entities.insert(handle, key);
        handle
    }

    pub fn layers(&self) -> &MarkerLayers {
        &self.layers
    }

    pub fn resolve(&self, handle: MarkerHandle) -> Option<EntityKey> {
        self.entities.get(&handle).copied()
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<&Marker> {
        self.layers
            .requests
            .iter()
            .chain(self.layers.technicians.iter())
            .find(|m| m.handle == handle)
    }
}

fn line(label: &str, value: Option<String>) -> PopupLine {
    PopupLine {
        label: label.to_string(),
        // Unset fields print the way the loader saw them
        value: value.unwrap_or_else(|| "null".to_string()),
        emphasis: false,
    }
}

fn request_popup(request: &ServiceRequest) -> Popup {
    let or_na = |column: &str| Some(request.field(column).unwrap_or_else(|| "N/A".to_string()));
    let mut priority = line("Priority", request.priority_label());
    priority.emphasis = true;

    Popup {
        title: request.customer_name().unwrap_or_default(),
        lines: vec![
            line("Address", request.field(columns::CUSTOMER_ADDRESS)),
            line("Appliance", request.field(columns::APPLIANCE_TYPE)),
            line("Problem", request.field(columns::PROBLEM_DESCRIPTION)),
            priority,
            line("Status", request.field(columns::STATUS)),
            line("Scheduled", or_na(columns::SCHEDULED)),
            line("Contact", or_na(columns::CONTACT_NUMBER)),
        ],
        button: PopupButton {
            data_attribute: "data-request-id".to_string(),
            entity_id: request.id.clone(),
            label: SELECT_BUTTON_LABEL.to_string(),
        },
    }
}

fn technician_popup(tech: &Technician) -> Popup {
    Popup {
        title: tech.display_name().to_string(),
        lines: vec![
            line("ID", tech.id.clone()),
            line("Skills", Some(tech.skills.clone())),
            line("Status", Some(tech.availability.clone())),
        ],
        button: PopupButton {
            data_attribute: "data-tech-id".to_string(),
            entity_id: tech.id.clone().unwrap_or_default(),
            label: SELECT_BUTTON_LABEL.to_string(),
        },
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::data_loader::parse_dataset;

    const CSV: &str = "\
Service Request ID,Customer Name,Customer Address,Appliance Type,Problem Description,Severity/Priority,Status,Scheduled Date/Time,Contact Number,Latitude,Longitude
SR001,Tech One,,,,,,,,0.34,32.58
SR002,Tech Two,,,,,,,,,
SR003,Aisha <K>,Plot 4 Kampala Rd,Washer,Leaking,High,Pending,,0772000111,0.31,32.57
SR004,Brian O,Plot 9 Jinja Rd,Fridge,Noisy,Medium,Assigned,2025-06-02 09:00,,0.32,32.59
SR005,Carol M,Ntinda,Oven,No heat,low,Pending,,,0,32.60
";

    fn dataset() -> Dataset {
        parse_dataset(CSV, 2).unwrap()
    }

    #[test]
    fn test_markers_only_for_valid_coordinates() {
        let mut renderer = MarkerRenderer::new();
        let layers = renderer.render(&dataset());

        assert_eq!(layers.technicians.len(), 1);
        assert_eq!(layers.technicians[0].entity_id.as_deref(), Some("SR001"));
        // SR005 sits at latitude 0
        let ids: Vec<_> = layers.requests.iter().map(|m| m.entity_id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["SR003", "SR004"]);
    }

    #[test]
    fn test_priority_icons() {
        let mut renderer = MarkerRenderer::new();
        let layers = renderer.render(&dataset());
        assert_eq!(layers.requests[0].icon.class_name, "request-marker-high");
        assert_eq!(layers.requests[1].icon.class_name, "request-marker-medium");
        assert_eq!(Icon::request(Priority::Low).class_name, "request-marker-low");
        assert_eq!(layers.technicians[0].icon, Icon::technician());
    }

    #[test]
    fn test_rerender_invalidates_old_handles() {
        let data = dataset();
        let mut renderer = MarkerRenderer::new();
        let old = renderer.render(&data).requests[0].handle;
        assert_eq!(renderer.resolve(old), Some(EntityKey::Request(0)));

        let new = renderer.render(&data).requests[0].handle;
        assert_ne!(old, new);
        assert_eq!(renderer.resolve(old), None);
        assert_eq!(renderer.resolve(new), Some(EntityKey::Request(0)));
        assert_eq!(renderer.layers().requests.len(), 2);
    }

    #[test]
    fn test_request_popup_contents() {
        let mut renderer = MarkerRenderer::new();
        let layers = renderer.render(&dataset());
        let popup = &layers.requests[0].popup;

        assert_eq!(popup.title, "Aisha <K>");
        let scheduled = popup.lines.iter().find(|l| l.label == "Scheduled").unwrap();
        assert_eq!(scheduled.value, "N/A");
        let contact = popup.lines.iter().find(|l| l.label == "Contact").unwrap();
        assert_eq!(contact.value, "772000111");

        let html = popup.to_html();
        assert!(html.starts_with("<b>Aisha &lt;K&gt;</b><br>"));
        assert!(html.contains("Priority: <b>High</b>"));
        assert!(html.contains(
            "<button data-request-id=\"SR003\" class=\"assign-btn\">Select for Route</button>"
        ));
    }

    #[test]
    fn test_technician_popup_contents() {
        let mut renderer = MarkerRenderer::new();
        let handle = renderer.render(&dataset()).technicians[0].handle;
        let html = renderer.marker(handle).unwrap().popup.to_html();
        assert!(html.contains("ID: SR001"));
        assert!(html.contains("Skills: All Appliances"));
        assert!(html.contains("Status: Available"));
        assert!(html.contains("data-tech-id=\"SR001\""));
    }
}
