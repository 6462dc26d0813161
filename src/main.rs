// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::application::data_loader::load_dataset;
use crate::application::dispatch_controller::DispatchController;
use crate::application::dispatch_service::DispatchService;
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::csv_source::CsvSource;
use crate::infrastructure::osrm_router::OsrmRouter;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = load_app_config()?;

    // Load dataset; a failure here is terminal
    let source = CsvSource::parse(&config.dataset.source);
    let dataset = match load_dataset(&source, config.dataset.technician_count).await {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::error!("Error loading dispatch data from {}: {}", source, e);
            return Err(e.into());
        }
    };

    // Create routing provider (infrastructure layer)
    let router = Arc::new(OsrmRouter::new(config.routing.service_url.clone()));

    // Create services (application layer)
    let controller = DispatchController::new(dataset, config.map_options());
    let dispatch_service = DispatchService::new(controller, router);

    // Create application state
    let state = Arc::new(AppState { dispatch_service });

    // Build router (presentation layer)
    let app = routes(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid server.bind '{}'", config.server.bind))?;
    tracing::info!("Starting fixit-dispatch service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
