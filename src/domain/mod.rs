// Domain layer - Dispatch entities and value types
pub mod geo;
pub mod record;
pub mod route;
pub mod selection;
pub mod service_request;
pub mod technician;
