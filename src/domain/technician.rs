// Technician domain model
use super::geo::LatLng;
use super::record::Record;
use super::service_request::columns;
use serde::Serialize;

pub const PLACEHOLDER_SKILLS: &str = "All Appliances";
pub const PLACEHOLDER_AVAILABILITY: &str = "Available";

/// Field technician, derived positionally from a dataset row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Technician {
    pub id: Option<String>,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub skills: String,
    pub availability: String,
    pub vehicle_id: String,
}

impl Technician {
    pub fn from_record(record: &Record) -> Self {
        let id = record.text(columns::ID);
        let vehicle_id = id
            .as_deref()
            .map(|id| id.replacen("SR", "VCL", 1))
            .unwrap_or_else(|| "N/A".to_string());

        Self {
            name: record.text(columns::CUSTOMER_NAME),
            latitude: record.number(columns::LATITUDE),
            longitude: record.number(columns::LONGITUDE),
            skills: PLACEHOLDER_SKILLS.to_string(),
            availability: PLACEHOLDER_AVAILABILITY.to_string(),
            vehicle_id,
            id,
        }
    }

    pub fn location(&self) -> Option<LatLng> {
        LatLng::from_parts(self.latitude, self.longitude)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed technician")
    }
}
