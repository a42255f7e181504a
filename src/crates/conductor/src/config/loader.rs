//! Layered configuration loading
//!
//! Sources, later ones overriding earlier ones:
//! 1. Default values
//! 2. User-level config: ~/.conductor/conductor.toml
//! 3. Project-level config: ./.conductor/conductor.toml
//! 4. An explicit `--config` file (TOML, or YAML by extension)
//! 5. `CONDUCTOR_*` environment variables
//!
//! Files are merged key by key, so a project file that only sets
//! `[llm] model` keeps the provider chosen in the user file.

use super::schema::{ConductorConfig, LOG_FORMATS, TOOL_PROVIDERS};
use crate::error::ConfigError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tooling::config::{expand_env_vars, get_env, get_env_parse};
use tracing::{debug, info};

type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration loader for the user, project and explicit locations
pub struct ConfigLoader {
    user_config_path: Option<PathBuf>,
    project_config_path: PathBuf,
    explicit_path: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            user_config_path: dirs::home_dir().map(|home| home.join(".conductor").join("conductor.toml")),
            project_config_path: PathBuf::from(".conductor").join("conductor.toml"),
            explicit_path: None,
        }
    }

    /// Also load `path`, which must exist.
    pub fn with_explicit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    pub fn user_config_path(&self) -> Option<&Path> {
        self.user_config_path.as_deref()
    }

    pub fn project_config_path(&self) -> &Path {
        &self.project_config_path
    }

    /// Load, merge, apply environment overrides and validate.
    pub async fn load(&self) -> Result<ConductorConfig> {
        let mut merged = serde_json::to_value(ConductorConfig::default())
            .map_err(|e| ConfigError::Invalid(format!("default configuration: {}", e)))?;

        let optional = self
            .user_config_path
            .iter()
            .chain(std::iter::once(&self.project_config_path));
        for path in optional {
            if !path.exists() {
                debug!(path = %path.display(), "config file not found, skipping");
                continue;
            }
            let layer = Self::read_layer(path).await?;
            merge_values(&mut merged, layer);
            debug!(path = %path.display(), "merged config file");
        }

        if let Some(path) = &self.explicit_path {
            let layer = Self::read_layer(path).await?;
            merge_values(&mut merged, layer);
            debug!(path = %path.display(), "merged explicit config file");
        }

        let mut config: ConductorConfig = serde_json::from_value(merged).map_err(|e| ConfigError::Parse {
            path: self
                .explicit_path
                .clone()
                .unwrap_or_else(|| self.project_config_path.clone()),
            message: e.to_string(),
        })?;

        config.apply_overrides(get_env)?;
        config.resolve_env_vars();
        config.validate()?;

        info!(
            llm = %config.llm.provider,
            tools = %config.tools.provider,
            "configuration loaded"
        );
        Ok(config)
    }

    async fn read_layer(path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path).await.map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let parsed = if is_yaml {
            serde_yaml::from_str::<Value>(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str::<Value>(&content).map_err(|e| e.to_string())
        };

        match parsed {
            Ok(Value::Null) => Ok(Value::Object(Default::default())),
            Ok(value) => Ok(value),
            Err(message) => Err(ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            }),
        }
    }
}

/// Recursively overlay `layer` onto `base`. Tables merge, everything else replaces.
fn merge_values(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

impl ConductorConfig {
    /// Apply `CONDUCTOR_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> tooling::Result<Option<String>>,
    {
        if let Some(host) = lookup("CONDUCTOR_HOST")? {
            self.server.host = host;
        }
        if let Some(port) = get_env_parse::<u16, _>(&lookup, "CONDUCTOR_PORT")? {
            self.server.port = port;
        }
        if let Some(provider) = lookup("CONDUCTOR_LLM_PROVIDER")? {
            self.llm.provider = provider;
        }
        if let Some(model) = lookup("CONDUCTOR_LLM_MODEL")? {
            self.llm.model = model;
        }
        if let Some(key) = lookup("CONDUCTOR_LLM_API_KEY")? {
            self.llm.api_key = Some(key);
        }
        if let Some(base) = lookup("CONDUCTOR_LLM_API_BASE")? {
            self.llm.api_base = Some(base);
        }
        if let Some(level) = lookup("CONDUCTOR_LOG_LEVEL")? {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Expand `${VAR}` references in secrets, URLs and MCP child environment.
    pub fn resolve_env_vars(&mut self) {
        if let Some(api_key) = &self.llm.api_key {
            self.llm.api_key = Some(expand_env_vars(api_key));
        }
        if let Some(api_base) = &self.llm.api_base {
            self.llm.api_base = Some(expand_env_vars(api_base));
        }
        if let Some(mcp) = &mut self.tools.mcp {
            for value in mcp.env.values_mut() {
                *value = expand_env_vars(value);
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".to_string()));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "logging.format must be one of {}, got '{}'",
                LOG_FORMATS.join(", "),
                self.logging.format
            )));
        }
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::Invalid("llm.model must be set".to_string()));
        }
        if self.llm.timeout_secs == 0 {
            return Err(ConfigError::Invalid("llm.timeout_secs must be non-zero".to_string()));
        }
        for (name, t) in [
            ("classification_temperature", self.llm.classification_temperature),
            ("prompting_temperature", self.llm.prompting_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::Invalid(format!("llm.{} must be within 0.0..=2.0", name)));
            }
        }
        if !TOOL_PROVIDERS.contains(&self.tools.provider.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "tools.provider must be one of {}, got '{}'",
                TOOL_PROVIDERS.join(", "),
                self.tools.provider
            )));
        }
        if self.tools.provider == "mcp"
            && self.tools.mcp.as_ref().map_or(true, |m| m.command.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "tools.provider = \"mcp\" requires [tools.mcp] command".to_string(),
            ));
        }
        if self.tools.list_timeout_secs == 0 || self.tools.invoke_timeout_secs == 0 {
            return Err(ConfigError::Invalid("tool timeouts must be non-zero".to_string()));
        }
        Ok(())
    }
}
