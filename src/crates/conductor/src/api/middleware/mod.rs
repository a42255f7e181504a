//! HTTP middleware: request tracing and CORS.

pub mod cors;
pub mod logging;

pub use cors::cors_layer;
pub use logging::logging_layer;
