//! CORS middleware configuration

use tower_http::cors::{Any, CorsLayer};

/// Browser chat clients run on their own origin; allow any origin for the
/// JSON endpoints.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
