//! Tool catalog construction from `[tools]` settings.

use crate::config::ToolsConfig;
use crate::error::ConfigError;
use std::sync::Arc;
use tooling::{McpToolProvider, StaticToolProvider, ToolCatalog, ToolProvider};
use tracing::info;

/// Provider selected by `tools.provider`, wrapped in a catalog with the
/// configured timeouts.
pub fn build_tool_catalog(config: &ToolsConfig) -> Result<ToolCatalog, ConfigError> {
    let provider: Arc<dyn ToolProvider> = match config.provider.as_str() {
        "mcp" => {
            let server = config
                .mcp
                .clone()
                .ok_or_else(|| ConfigError::Invalid("[tools.mcp] is required for the mcp provider".to_string()))?;
            info!(command = %server.command, "using MCP tool provider");
            Arc::new(McpToolProvider::new(server)?)
        }
        "static" => {
            info!(count = config.static_tools.len(), "using static tool provider");
            Arc::new(StaticToolProvider::new(
                config.static_tools.clone(),
                config.invoke_timeout(),
            )?)
        }
        other => {
            return Err(ConfigError::Invalid(format!("unknown tool provider '{}'", other)));
        }
    };

    Ok(ToolCatalog::new(provider)
        .with_list_timeout(config.list_timeout())
        .with_invoke_timeout(config.invoke_timeout()))
}
