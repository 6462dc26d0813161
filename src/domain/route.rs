// Driving route models
use super::geo::{Bounds, LatLng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelProfile {
    Driving,
    Walking,
    Cycling,
}

impl TravelProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelProfile::Driving => "driving",
            TravelProfile::Walking => "walking",
            TravelProfile::Cycling => "cycling",
        }
    }
}

/// A two-waypoint routing query. Alternatives are never requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRequest {
    pub generation: u64,
    pub from: LatLng,
    pub to: LatLng,
    pub profile: TravelProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub coordinates: Vec<LatLng>,
    pub distance_m: Option<f64>,
    pub duration_s: Option<f64>,
}

impl Route {
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::enclosing(&self.coordinates)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub weight: u32,
    pub opacity: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "#007bff".to_string(),
            weight: 5,
            opacity: 0.7,
        }
    }
}

/// The route currently drawn (or being fetched) between the two selections
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveRoute {
    pub generation: u64,
    pub technician_id: Option<String>,
    pub request_id: String,
    pub from: LatLng,
    pub to: LatLng,
    pub style: LineStyle,
    /// `None` until the provider answers
    pub route: Option<Route>,
}
