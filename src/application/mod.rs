// Application layer - Dispatch use cases and view rendering
pub mod data_loader;
pub mod dispatch_controller;
pub mod dispatch_service;
pub mod marker_renderer;
pub mod routing_provider;
pub mod sidebar_renderer;
