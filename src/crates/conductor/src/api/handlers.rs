//! Request handlers

use super::error::ApiResult;
use super::routes::AppState;
use crate::error::ConversationError;
use crate::message::{ConversationRequest, Message};
use axum::{body::Bytes, extract::State, Json};
use serde::{Deserialize, Serialize};
use tooling::Tool;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Handler for GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handler for GET /tools
pub async fn list_tools(State(state): State<AppState>) -> ApiResult<Json<Vec<Tool>>> {
    let tools = state
        .orchestrator
        .catalog()
        .list_tools()
        .await
        .map_err(ConversationError::from)?;
    Ok(Json(tools))
}

/// Handler for POST /conversation
///
/// The body is parsed here rather than by an extractor so that malformed
/// JSON gets the same `{error, code}` body as every other failure.
pub async fn conversation(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Message>> {
    let request = ConversationRequest::from_slice(&body)?;
    debug!(messages = request.messages.len(), "conversation turn");
    let reply = state.orchestrator.handle(&request).await?;
    Ok(Json(reply))
}
