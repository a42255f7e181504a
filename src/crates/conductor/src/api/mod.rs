//! HTTP surface
//!
//! - `POST /conversation` advances a conversation by one turn
//! - `GET /tools` lists the provider's current tools
//! - `GET /health` liveness

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use error::{ApiError, ApiErrorResponse, ApiResult};
pub use routes::{create_router, AppState};
