// Service request domain model and priority filtering
use super::geo::LatLng;
use super::record::Record;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Dataset column names
pub mod columns {
    pub const ID: &str = "Service Request ID";
    pub const CUSTOMER_NAME: &str = "Customer Name";
    pub const CUSTOMER_ADDRESS: &str = "Customer Address";
    pub const APPLIANCE_TYPE: &str = "Appliance Type";
    pub const PROBLEM_DESCRIPTION: &str = "Problem Description";
    pub const PRIORITY: &str = "Severity/Priority";
    pub const STATUS: &str = "Status";
    pub const SCHEDULED: &str = "Scheduled Date/Time";
    pub const CONTACT_NUMBER: &str = "Contact Number";
    pub const LATITUDE: &str = "Latitude";
    pub const LONGITUDE: &str = "Longitude";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    /// Exact, case-sensitive match; anything unrecognised is `Low`.
    pub fn from_field(value: Option<&str>) -> Self {
        match value {
            Some("High") => Priority::High,
            Some("Medium") => Priority::Medium,
            _ => Priority::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown priority filter '{0}', expected All, Low, Medium or High")]
pub struct UnknownPriorityFilter(pub String);

/// Sidebar priority dropdown value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn matches(&self, request: &ServiceRequest) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(priority) => {
                request.priority_label().as_deref() == Some(priority.label())
            }
        }
    }
}

impl FromStr for PriorityFilter {
    type Err = UnknownPriorityFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "All" => Ok(PriorityFilter::All),
            "Low" => Ok(PriorityFilter::Only(Priority::Low)),
            "Medium" => Ok(PriorityFilter::Only(Priority::Medium)),
            "High" => Ok(PriorityFilter::Only(Priority::High)),
            other => Err(UnknownPriorityFilter(other.to_string())),
        }
    }
}

impl fmt::Display for PriorityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityFilter::All => f.write_str("All"),
            PriorityFilter::Only(priority) => f.write_str(priority.label()),
        }
    }
}

impl Serialize for PriorityFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A dataset row known to carry an identifier and both coordinate cells
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRequest {
    pub id: String,
    pub record: Record,
}

impl ServiceRequest {
    /// `None` when the row lacks latitude, longitude or identifier.
    pub fn from_record(record: Record) -> Option<Self> {
        if record.is_null(columns::LATITUDE) || record.is_null(columns::LONGITUDE) {
            return None;
        }
        let id = record.text(columns::ID)?;
        Some(Self { id, record })
    }

    pub fn field(&self, column: &str) -> Option<String> {
        self.record.text(column)
    }

    pub fn customer_name(&self) -> Option<String> {
        self.field(columns::CUSTOMER_NAME)
    }

    pub fn priority_label(&self) -> Option<String> {
        self.field(columns::PRIORITY)
    }

    pub fn priority(&self) -> Priority {
        Priority::from_field(self.priority_label().as_deref())
    }

    pub fn location(&self) -> Option<LatLng> {
        LatLng::from_parts(
            self.record.number(columns::LATITUDE),
            self.record.number(columns::LONGITUDE),
        )
    }
}
