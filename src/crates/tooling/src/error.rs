//! Error types for tool discovery and invocation.

use std::time::Duration;
use thiserror::Error;

/// Result type for tooling operations.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors raised while listing or invoking tools.
///
/// Connection problems (`ProviderUnavailable`) are kept apart from failures of
/// an individual tool call (`ExecutionFailed`) so callers can decide whether
/// the whole request or only the tool result is affected.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The provider could not be reached or refused the session.
    #[error("Tool provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// No tool with the given name exists in the catalog.
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// The provider was reached but the tool call failed.
    #[error("Tool '{tool}' failed: {message}")]
    ExecutionFailed { tool: String, message: String },

    /// An upstream operation exceeded its deadline.
    #[error("{operation} timed out after {duration:?}")]
    Timeout { operation: String, duration: Duration },

    /// Invalid provider or environment configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ToolError {
    /// Build an execution failure for `tool`.
    pub fn execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        ToolError::ExecutionFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether retrying the same operation later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ToolError::ProviderUnavailable(_) | ToolError::Timeout { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ToolError::Timeout { .. })
    }
}
