//! Tool catalog: timed access to a provider plus name lookup.

use crate::async_utils::timeout::with_timeout;
use crate::error::{Result, ToolError};
use crate::provider::{ToolOutput, ToolProvider};
use crate::schema::{Tool, ToolSchema};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_INVOKE_TIMEOUT: Duration = Duration::from_secs(60);

/// Fetches tools from a provider and invokes them under deadlines.
///
/// The catalog holds no tool list of its own: every [`ToolCatalog::list_tools`]
/// call goes back to the provider, so a conversation turn always sees the
/// provider's current tools.
#[derive(Clone)]
pub struct ToolCatalog {
    provider: Arc<dyn ToolProvider>,
    list_timeout: Duration,
    invoke_timeout: Duration,
}

impl ToolCatalog {
    pub fn new(provider: Arc<dyn ToolProvider>) -> Self {
        Self {
            provider,
            list_timeout: DEFAULT_LIST_TIMEOUT,
            invoke_timeout: DEFAULT_INVOKE_TIMEOUT,
        }
    }

    pub fn with_list_timeout(mut self, timeout: Duration) -> Self {
        self.list_timeout = timeout;
        self
    }

    pub fn with_invoke_timeout(mut self, timeout: Duration) -> Self {
        self.invoke_timeout = timeout;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// List the provider's tools.
    ///
    /// # Errors
    ///
    /// `ProviderUnavailable` when the provider cannot be reached, `Timeout`
    /// when it does not answer within the list timeout.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        let tools = with_timeout(self.list_timeout, self.provider.list_tools())
            .await
            .map_err(|e| {
                e.flatten(|duration| ToolError::Timeout {
                    operation: "tools/list".to_string(),
                    duration,
                })
            })?;

        debug!(provider = self.provider_name(), count = tools.len(), "fetched tool catalog");
        Ok(tools)
    }

    /// Find a tool by name, ignoring ASCII case.
    pub fn find_tool<'a>(tools: &'a [Tool], name: &str) -> Option<&'a Tool> {
        tools.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Input schema of the named tool, ignoring ASCII case.
    pub fn find_schema<'a>(tools: &'a [Tool], name: &str) -> Option<&'a ToolSchema> {
        Self::find_tool(tools, name).map(|t| &t.input_schema)
    }

    /// Invoke a tool with the given arguments.
    ///
    /// # Errors
    ///
    /// Provider failures surface as `ExecutionFailed` (or `ProviderUnavailable`
    /// when no session could be opened); exceeding the invoke timeout yields
    /// `Timeout`.
    pub async fn invoke(&self, name: &str, arguments: Map<String, Value>) -> Result<ToolOutput> {
        info!(tool = name, provider = self.provider_name(), "invoking tool");
        with_timeout(self.invoke_timeout, self.provider.call_tool(name, arguments))
            .await
            .map_err(|e| {
                e.flatten(|duration| ToolError::Timeout {
                    operation: format!("tool '{}'", name),
                    duration,
                })
            })
    }
}
