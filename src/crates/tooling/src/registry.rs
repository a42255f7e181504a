//! Configuration-declared HTTP tools.
//!
//! Each entry names a tool, describes its input schema and points at an HTTP
//! endpoint. Invocation sends the collected arguments to that endpoint.
//!
//! ```toml
//! [[tools.static]]
//! name = "deploy_contract"
//! description = "Deploys a token contract"
//! endpoint = "https://chain-api.internal/deploy"
//!
//! [tools.static.input_schema]
//! type = "object"
//! required = ["owner", "amount"]
//!
//! [tools.static.input_schema.properties.owner]
//! type = "string"
//! description = "Owner wallet address"
//! ```

use crate::config::expand_env_vars;
use crate::error::{Result, ToolError};
use crate::provider::{ToolOutput, ToolProvider};
use crate::schema::{Tool, ToolSchema};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// One statically configured tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticToolConfig {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub input_schema: ToolSchema,

    /// URL the arguments are sent to.
    pub endpoint: String,

    /// HTTP method; `GET` sends arguments as query parameters, anything else as a JSON body.
    #[serde(default = "default_method")]
    pub method: String,

    /// Extra request headers; values support `${VAR}` interpolation.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_method() -> String {
    "POST".to_string()
}

impl StaticToolConfig {
    fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}

/// Tool provider serving tools declared in configuration.
pub struct StaticToolProvider {
    tools: Vec<StaticToolConfig>,
    client: Client,
}

impl StaticToolProvider {
    pub fn new(tools: Vec<StaticToolConfig>, timeout: Duration) -> Result<Self> {
        for tool in &tools {
            Method::from_bytes(tool.method.to_uppercase().as_bytes()).map_err(|_| {
                ToolError::Config(format!(
                    "tool '{}' has invalid HTTP method '{}'",
                    tool.name, tool.method
                ))
            })?;
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToolError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { tools, client })
    }

    fn find(&self, name: &str) -> Option<&StaticToolConfig> {
        self.tools.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

#[async_trait]
impl ToolProvider for StaticToolProvider {
    async fn list_tools(&self) -> Result<Vec<Tool>> {
        Ok(self.tools.iter().map(StaticToolConfig::to_tool).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<ToolOutput> {
        let tool = self
            .find(name)
            .ok_or_else(|| ToolError::ToolNotFound(name.to_string()))?;

        let method = Method::from_bytes(tool.method.to_uppercase().as_bytes())
            .map_err(|_| ToolError::Config(format!("invalid HTTP method '{}'", tool.method)))?;

        let mut request = self.client.request(method.clone(), &tool.endpoint);
        request = if method == Method::GET {
            let query: Vec<(String, String)> = arguments
                .iter()
                .map(|(k, v)| {
                    let rendered = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), rendered)
                })
                .collect();
            request.query(&query)
        } else {
            request.json(&arguments)
        };
        for (key, value) in &tool.headers {
            request = request.header(key.as_str(), expand_env_vars(value));
        }

        debug!(tool = %tool.name, endpoint = %tool.endpoint, "invoking HTTP tool");
        let response = request
            .send()
            .await
            .map_err(|e| ToolError::execution(&tool.name, e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ToolError::execution(&tool.name, e.to_string()))?;

        if !status.is_success() {
            return Err(ToolError::execution(
                &tool.name,
                format!("endpoint returned {}: {}", status, body.trim()),
            ));
        }

        Ok(match serde_json::from_str::<Value>(&body) {
            Ok(data) => ToolOutput::json(data),
            Err(_) => ToolOutput::text(body),
        })
    }

    fn provider_name(&self) -> &str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deploy_tool(endpoint: &str) -> StaticToolConfig {
        toml::from_str(&format!(
            r#"
name = "deploy_contract"
description = "Deploys a token contract"
endpoint = "{endpoint}"

[input_schema]
type = "object"
required = ["owner", "amount"]

[input_schema.properties.owner]
type = "string"

[input_schema.properties.amount]
type = "number"
"#
        ))
        .unwrap()
    }

    #[test]
    fn test_config_defaults_to_post() {
        let tool = deploy_tool("http://localhost/deploy");
        assert_eq!(tool.method, "POST");
        assert_eq!(tool.input_schema.required, vec!["owner", "amount"]);
        assert!(tool.input_schema.is_declared("amount"));
    }

    #[test]
    fn test_invalid_method_rejected() {
        let mut tool = deploy_tool("http://localhost/deploy");
        tool.method = "NOT A METHOD".to_string();
        let result = StaticToolProvider::new(vec![tool], Duration::from_secs(1));
        assert!(matches!(result, Err(ToolError::Config(_))));
    }

    #[tokio::test]
    async fn test_list_tools_returns_configured_tools() {
        let provider =
            StaticToolProvider::new(vec![deploy_tool("http://localhost/deploy")], Duration::from_secs(1))
                .unwrap();
        let tools = provider.list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "deploy_contract");
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let provider = StaticToolProvider::new(Vec::new(), Duration::from_secs(1)).unwrap();
        let err = provider.call_tool("nope", Map::new()).await.unwrap_err();
        assert!(matches!(err, ToolError::ToolNotFound(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_execution_failure() {
        let provider = StaticToolProvider::new(
            vec![deploy_tool("http://127.0.0.1:9/deploy")],
            Duration::from_secs(2),
        )
        .unwrap();

        let err = provider
            .call_tool("DEPLOY_CONTRACT", Map::new())
            .await
            .unwrap_err();
        match err {
            ToolError::ExecutionFailed { tool, .. } => assert_eq!(tool, "deploy_contract"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
