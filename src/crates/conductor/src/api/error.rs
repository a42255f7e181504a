//! API error types and HTTP response conversion

use crate::error::ConversationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body: `{ "error": "...", "code": "..." }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Error code for programmatic handling
    pub code: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Tool service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("{0}")]
    GatewayTimeout(String),

    #[error("Language model error: {0}")]
    BadGateway(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ServiceUnavailable(_) => "PROVIDER_UNAVAILABLE",
            ApiError::GatewayTimeout(_) => "TIMEOUT",
            ApiError::BadGateway(_) => "MODEL_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ConversationError> for ApiError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::BadRequest(msg) => ApiError::BadRequest(msg),
            ConversationError::ProviderUnavailable(msg) => ApiError::ServiceUnavailable(msg),
            e @ ConversationError::Timeout { .. } => ApiError::GatewayTimeout(e.to_string()),
            ConversationError::Model(e) => ApiError::BadGateway(e.to_string()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code = %body.code, error = %body.error, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), code = %body.code, error = %body.error, "request rejected");
        }

        (status, Json(body)).into_response()
    }
}
