//! Server configuration: schema and layered loading.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::{ConductorConfig, LlmSettings, LoggingConfig, ServerConfig, ToolsConfig};
