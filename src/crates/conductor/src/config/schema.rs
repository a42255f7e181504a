//! Configuration schema for the conductor server

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tooling::{McpServerConfig, StaticToolConfig};

/// Main conductor configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConductorConfig {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,

    /// Language model used for classification, extraction and prompting
    #[serde(default)]
    pub llm: LlmSettings,

    /// Tool provider
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// "ollama", "openai", "openrouter", "groq" or any OpenAI-compatible name
    pub provider: String,

    /// Model name
    pub model: String,

    /// API key (supports environment variable interpolation)
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Temperature for intent detection and parameter extraction
    pub classification_temperature: f32,

    /// Temperature for user-facing prompts
    pub prompting_temperature: f32,

    /// Per-call deadline in seconds
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "llama3.1".to_string(),
            api_key: None,
            api_base: None,
            classification_temperature: 0.0,
            prompting_temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Tool provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// "mcp" or "static"
    pub provider: String,

    pub list_timeout_secs: u64,

    pub invoke_timeout_secs: u64,

    /// MCP server to spawn when `provider = "mcp"`
    pub mcp: Option<McpServerConfig>,

    /// Tools served when `provider = "static"`
    #[serde(rename = "static")]
    pub static_tools: Vec<StaticToolConfig>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            provider: "static".to_string(),
            list_timeout_secs: 10,
            invoke_timeout_secs: 60,
            mcp: None,
            static_tools: Vec::new(),
        }
    }
}

impl ToolsConfig {
    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_secs)
    }

    pub fn invoke_timeout(&self) -> Duration {
        Duration::from_secs(self.invoke_timeout_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,

    /// "compact", "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

/// Accepted values of `logging.format`.
pub const LOG_FORMATS: [&str; 3] = ["compact", "pretty", "json"];

/// Accepted values of `tools.provider`.
pub const TOOL_PROVIDERS: [&str; 2] = ["mcp", "static"];
