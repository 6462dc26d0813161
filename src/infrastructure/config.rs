use crate::application::data_loader::DEFAULT_TECHNICIAN_COUNT;
use crate::application::dispatch_controller::{MapOptions, TileLayer};
use crate::domain::geo::LatLng;
use crate::domain::route::{LineStyle, TravelProfile};
use crate::infrastructure::osrm_router::DEFAULT_SERVICE_URL;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub dataset: DatasetSettings,
    pub map: MapSettings,
    pub routing: RoutingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetSettings {
    /// Relative path or http(s) URL of the CSV
    pub source: String,
    pub technician_count: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MapSettings {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub focus_zoom: u8,
    pub tile_url: String,
    pub attribution: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RoutingSettings {
    pub service_url: String,
    pub profile: TravelProfile,
    pub line_color: String,
    pub line_weight: u32,
    pub line_opacity: f64,
    pub fit_padding: u32,
}

impl AppConfig {
    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            tile_layer: TileLayer {
                url_template: self.map.tile_url.clone(),
                attribution: self.map.attribution.clone(),
            },
            initial_center: LatLng::new(self.map.center_lat, self.map.center_lon),
            initial_zoom: self.map.zoom,
            focus_zoom: self.map.focus_zoom,
            fit_padding: [self.routing.fit_padding, self.routing.fit_padding],
            line_style: LineStyle {
                color: self.routing.line_color.clone(),
                weight: self.routing.line_weight,
                opacity: self.routing.line_opacity,
            },
            profile: self.routing.profile,
        }
    }
}

fn builder_with_defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
    let map = MapOptions::default();
    let line = LineStyle::default();

    Ok(config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("dataset.source", "FixitFast_data.csv")?
        .set_default("dataset.technician_count", DEFAULT_TECHNICIAN_COUNT as u64)?
        .set_default("map.center_lat", map.initial_center.lat)?
        .set_default("map.center_lon", map.initial_center.lon)?
        .set_default("map.zoom", map.initial_zoom as u64)?
        .set_default("map.focus_zoom", map.focus_zoom as u64)?
        .set_default("map.tile_url", map.tile_layer.url_template)?
        .set_default("map.attribution", map.tile_layer.attribution)?
        .set_default("routing.service_url", DEFAULT_SERVICE_URL)?
        .set_default("routing.profile", map.profile.as_str())?
        .set_default("routing.line_color", line.color)?
        .set_default("routing.line_weight", line.weight as u64)?
        .set_default("routing.line_opacity", line.opacity)?
        .set_default("routing.fit_padding", map.fit_padding[0] as u64)?)
}

/// Defaults, then `config/dispatch.toml` if present, then `DISPATCH__*` env vars.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = builder_with_defaults()?
        .add_source(config::File::with_name("config/dispatch").required(false))
        .add_source(
            config::Environment::with_prefix("DISPATCH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
