//! Tool discovery and invocation for conductor.
//!
//! # Modules
//!
//! - `schema` - `Tool` and its lenient `ToolSchema`
//! - `provider` - the `ToolProvider` trait and `ToolOutput`
//! - `mcp` - provider backed by an MCP server over stdio
//! - `registry` - provider serving HTTP tools declared in configuration
//! - `catalog` - `ToolCatalog`, timed listing/invocation and name lookup
//! - `async_utils` - deadline helper for upstream calls
//! - `config` - environment variable helpers

pub mod async_utils;
pub mod catalog;
pub mod config;
pub mod error;
pub mod mcp;
pub mod provider;
pub mod registry;
pub mod schema;

pub use catalog::ToolCatalog;
pub use error::{Result, ToolError};
pub use mcp::{McpServerConfig, McpToolProvider};
pub use provider::{ToolOutput, ToolProvider};
pub use registry::{StaticToolConfig, StaticToolProvider};
pub use schema::{Tool, ToolSchema};
