//! Error types for the conversation engine and its configuration.

use llm::LlmError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tooling::ToolError;

/// Result type for conversation operations.
pub type Result<T> = std::result::Result<T, ConversationError>;

/// Failures of a single conversation turn.
///
/// Only `BadRequest`, `ProviderUnavailable`, `Timeout` and `Model` leave the
/// orchestrator as errors. The remaining kinds are recovered inside the turn
/// and turned into an assistant message.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// The request body is unusable; nothing upstream was called.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The tool provider could not be reached.
    #[error("Tool service unavailable: {0}")]
    ProviderUnavailable(String),

    /// An upstream call exceeded its deadline.
    #[error("{operation} timed out after {duration:?}")]
    Timeout { operation: String, duration: Duration },

    /// The language model failed for a reason other than a timeout.
    #[error("Language model error: {0}")]
    Model(LlmError),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Tool '{tool}' failed: {message}")]
    ToolExecutionFailed { tool: String, message: String },

    /// The carried state violates its invariants.
    #[error("Conversation state is inconsistent: {0}")]
    StateCorruption(String),

    /// The model's parameter extraction could not be parsed or validated.
    #[error("Could not use extracted parameters: {0}")]
    ExtractionParse(String),
}

impl ConversationError {
    /// Whether the client may retry the same request.
    pub fn is_retryable(&self) -> bool {
        match self {
            ConversationError::ProviderUnavailable(_) | ConversationError::Timeout { .. } => true,
            ConversationError::Model(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<ToolError> for ConversationError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::ProviderUnavailable(msg) => ConversationError::ProviderUnavailable(msg),
            ToolError::ToolNotFound(name) => ConversationError::ToolNotFound(name),
            ToolError::ExecutionFailed { tool, message } => {
                ConversationError::ToolExecutionFailed { tool, message }
            }
            ToolError::Timeout {
                operation,
                duration,
            } => ConversationError::Timeout {
                operation,
                duration,
            },
            ToolError::Config(msg) => ConversationError::ProviderUnavailable(msg),
        }
    }
}

impl From<LlmError> for ConversationError {
    fn from(err: LlmError) -> Self {
        ConversationError::Model(err)
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error(transparent)]
    Tooling(#[from] ToolError),
}
