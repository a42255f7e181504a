//! The tool provider abstraction.
//!
//! The catalog depends on this trait instead of a concrete transport. The
//! crate ships an MCP implementation ([`crate::mcp::McpToolProvider`]) and a
//! configuration-backed HTTP one ([`crate::registry::StaticToolProvider`]).

use crate::error::Result;
use crate::schema::Tool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of a single tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Human-readable rendering of the result.
    pub text: String,

    /// Structured payload, when the provider returned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            data: None,
        }
    }

    /// Output carrying a JSON payload; string payloads are used as text directly.
    pub fn json(data: Value) -> Self {
        let text = match &data {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self {
            text,
            data: Some(data),
        }
    }
}

/// Source of tools: list them and call one by name.
///
/// Implementations report connection problems as
/// [`crate::ToolError::ProviderUnavailable`] and failures of a specific call
/// as [`crate::ToolError::ExecutionFailed`].
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// List available tools (MCP `tools/list`).
    async fn list_tools(&self) -> Result<Vec<Tool>>;

    /// Call a tool by name with JSON arguments (MCP `tools/call`).
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<ToolOutput>;

    /// Short provider name for logs.
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_output_renders_text() {
        let out = ToolOutput::json(json!({"address": "0xabc"}));
        assert_eq!(out.text, r#"{"address":"0xabc"}"#);
        assert!(out.data.is_some());

        let out = ToolOutput::json(json!("deployed"));
        assert_eq!(out.text, "deployed");
    }
}
