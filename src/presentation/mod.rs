// Presentation layer - HTTP surface over the dispatch board
pub mod api_error;
pub mod app_state;
pub mod handlers;
