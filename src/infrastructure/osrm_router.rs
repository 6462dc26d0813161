// OSRM routing provider implementation
use crate::application::routing_provider::RoutingProvider;
use crate::domain::geo::LatLng;
use crate::domain::route::{Route, RouteRequest, TravelProfile};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_SERVICE_URL: &str = "https://router.project-osrm.org/route/v1";

#[derive(Debug, Clone)]
pub struct OsrmRouter {
    service_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: OsrmGeometry,
    #[serde(default)]
    distance: Option<f64>,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    /// `[lon, lat]` pairs
    coordinates: Vec<[f64; 2]>,
}

impl OsrmRouter {
    pub fn new(service_url: String) -> Self {
        Self {
            service_url: service_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn build_route_url(&self, profile: TravelProfile, from: LatLng, to: LatLng) -> String {
        format!(
            "{}/{}/{},{};{},{}?overview=full&alternatives=false&steps=false&geometries=geojson",
            self.service_url,
            profile.as_str(),
            from.lon,
            from.lat,
            to.lon,
            to.lat
        )
    }
}

fn parse_routes(response: OsrmResponse) -> Result<Vec<Route>> {
    if response.code != "Ok" {
        anyhow::bail!(
            "OSRM returned {}: {}",
            response.code,
            response.message.unwrap_or_default()
        );
    }

    Ok(response
        .routes
        .into_iter()
        .map(|r| Route {
            coordinates: r
                .geometry
                .coordinates
                .into_iter()
                .map(|[lon, lat]| LatLng::new(lat, lon))
                .collect(),
            distance_m: r.distance,
            duration_s: r.duration,
        })
        .collect())
}

#[async_trait]
impl RoutingProvider for OsrmRouter {
    async fn find_routes(&self, request: &RouteRequest) -> Result<Vec<Route>> {
        let url = self.build_route_url(request.profile, request.from, request.to);
        tracing::debug!("Requesting route: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .context("Failed to send request to OSRM")?;

        // OSRM reports NoRoute and friends with 400 and a JSON body
        let status = response.status();
        let body = response.text().await.context("Failed to read OSRM response")?;
        let parsed: OsrmResponse = serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse OSRM response (status {})", status))?;

        parse_routes(parsed)
    }
}
