//! Model Context Protocol tool provider.
//!
//! Spawns the configured MCP server as a child process speaking stdio, runs
//! one request against it and shuts the session down again. A fresh session
//! per operation keeps the provider stateless; the catalog is re-fetched on
//! every conversation turn anyway.

use crate::error::{Result, ToolError};
use crate::provider::{ToolOutput, ToolProvider};
use crate::schema::{Tool, ToolSchema};
use async_trait::async_trait;
use rmcp::model::CallToolRequestParam;
use rmcp::service::{RunningService, ServiceExt};
use rmcp::transport::TokioChildProcess;
use rmcp::RoleClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::process::Command;
use tracing::{debug, warn};

/// How to launch an MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Executable to spawn.
    pub command: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment for the child process.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl McpServerConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Tool provider backed by an MCP server over stdio.
pub struct McpToolProvider {
    config: McpServerConfig,
}

impl McpToolProvider {
    pub fn new(config: McpServerConfig) -> Result<Self> {
        if config.command.trim().is_empty() {
            return Err(ToolError::Config(
                "MCP provider requires a server command".to_string(),
            ));
        }
        Ok(Self { config })
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(&self.config.args);
        for (key, value) in &self.config.env {
            cmd.env(key, value);
        }
        cmd
    }

    async fn connect(&self) -> Result<RunningService<RoleClient, ()>> {
        let transport = TokioChildProcess::new(self.command()).map_err(|e| {
            ToolError::ProviderUnavailable(format!(
                "failed to spawn MCP server '{}': {}",
                self.config.command, e
            ))
        })?;

        ().serve(transport).await.map_err(|e| {
            ToolError::ProviderUnavailable(format!("MCP handshake failed: {}", e))
        })
    }

    async fn shutdown(service: RunningService<RoleClient, ()>) {
        if let Err(e) = service.cancel().await {
            debug!(error = %e, "MCP session did not shut down cleanly");
        }
    }
}

#[async_trait]
impl ToolProvider for McpToolProvider {
    async fn list_tools(&self) -> Result<Vec<Tool>> {
        let service = self.connect().await?;
        let listed = service.list_tools(Default::default()).await;
        Self::shutdown(service).await;

        let listed = listed
            .map_err(|e| ToolError::ProviderUnavailable(format!("tools/list failed: {}", e)))?;

        let tools: Vec<Tool> = listed
            .tools
            .into_iter()
            .map(|t| Tool {
                name: t.name.to_string(),
                description: t.description.as_ref().map(|d| d.to_string()),
                input_schema: ToolSchema::from(Value::Object((*t.input_schema).clone())),
            })
            .collect();

        debug!(count = tools.len(), "listed MCP tools");
        Ok(tools)
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<ToolOutput> {
        let service = self.connect().await?;
        let called = service
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments: Some(arguments),
            })
            .await;
        Self::shutdown(service).await;

        let result = called.map_err(|e| ToolError::execution(name, e.to_string()))?;

        let text = result
            .content
            .iter()
            .filter_map(|c| c.as_text().map(|t| t.text.clone()))
            .collect::<Vec<_>>()
            .join("\n");

        if result.is_error == Some(true) {
            warn!(tool = name, "MCP tool reported an error");
            let message = if text.is_empty() {
                "tool reported an error".to_string()
            } else {
                text
            };
            return Err(ToolError::execution(name, message));
        }

        Ok(match result.structured_content {
            Some(data) if text.is_empty() => ToolOutput::json(data),
            data => ToolOutput { text, data },
        })
    }

    fn provider_name(&self) -> &str {
        "mcp"
    }
}
