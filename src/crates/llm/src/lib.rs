//! Language-model access for conductor.
//!
//! The conversation engine only sees the [`ChatModel`] trait. Two concrete
//! clients ship with this crate:
//!
//! - **Ollama** (`local` feature) for models served on localhost
//! - **OpenAI-compatible** (`remote` feature) for OpenAI and any service
//!   exposing `/chat/completions`
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::remote::OpenAiClient;
//! use llm::{ChatModel, RemoteLlmConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_key = std::env::var("OPENAI_API_KEY")?;
//!     let config = RemoteLlmConfig::new(api_key, "https://api.openai.com/v1", "gpt-4o-mini");
//!     let client = OpenAiClient::new(config)?;
//!
//!     let tool = client
//!         .complete("Answer with a tool name.", "deploy an ERC20 token", 0.0)
//!         .await?;
//!     println!("{tool}");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

#[cfg(feature = "local")]
pub mod local;

#[cfg(feature = "remote")]
pub mod remote;

pub use config::{LocalLlmConfig, RemoteLlmConfig};
pub use error::{LlmError, Result};
pub use traits::ChatModel;
pub use types::{ChatConfig, ChatRequest, ChatResponse, Message, MessageRole, UsageMetadata};
