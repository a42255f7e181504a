//! API route definitions

use super::handlers;
use super::middleware::{cors_layer, logging_layer};
use crate::orchestrator::ConversationOrchestrator;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConversationOrchestrator>,
}

/// Build the complete API router
pub fn create_router(orchestrator: Arc<ConversationOrchestrator>) -> Router {
    let app_state = AppState { orchestrator };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/tools", get(handlers::list_tools))
        .route("/conversation", post(handlers::conversation))
        .layer(logging_layer())
        .layer(cors_layer())
        .with_state(app_state)
}
