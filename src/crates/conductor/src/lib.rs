//! # Conductor
//!
//! Multi-turn tool invocation over a stateless chat API. A user describes
//! what they want in plain language; conductor picks the tool, collects its
//! arguments over as many turns as needed, and runs it once the user
//! confirms.
//!
//! ## Flow of a turn
//!
//! 1. Recover the [`ConversationState`] from the latest `tool-input-state`
//!    annotation in the message history.
//! 2. With a switch pending, resolve the yes/no answer
//!    ([`PendingSwitchResolver`]).
//! 3. With a tool active, decide between executing, proposing a switch and
//!    continuing ([`ContextSwitchDetector`]).
//! 4. Without a tool, detect one ([`IntentDetector`]).
//! 5. Extract arguments ([`ParameterExtractor`]), then report readiness or
//!    ask for the next missing parameter.
//!
//! The new state travels back to the client as an annotation on the reply,
//! so the server keeps no sessions.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use conductor::{build_chat_model, build_tool_catalog, ConfigLoader, ConversationOrchestrator, ModelClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ConfigLoader::new().load().await?;
//! let model = ModelClient::new(build_chat_model(&config.llm)?, config.llm.timeout());
//! let catalog = build_tool_catalog(&config.tools)?;
//! let orchestrator = Arc::new(ConversationOrchestrator::new(catalog, model, &config.llm));
//! let app = conductor::api::create_router(orchestrator);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod intent;
pub mod message;
pub mod missing;
pub mod model;
pub mod orchestrator;
pub mod pending;
pub mod prompts;
pub mod state;
pub mod switch;
pub mod validation;

pub use catalog::build_tool_catalog;
pub use config::{ConductorConfig, ConfigLoader};
pub use error::{ConfigError, ConversationError, Result};
pub use extract::ParameterExtractor;
pub use intent::IntentDetector;
pub use message::{ConversationRequest, Message, Role};
pub use missing::missing_parameters;
pub use model::{build_chat_model, ModelClient};
pub use orchestrator::ConversationOrchestrator;
pub use pending::{PendingReply, PendingSwitchResolver};
pub use state::{ConversationState, TOOL_INPUT_STATE};
pub use switch::{ContextSwitchDetector, KeywordSwitchHeuristic, SwitchDecision, SwitchHeuristic};
pub use validation::{FieldValidator, SchemaValidator, ValidationError, ValidatorRegistry};
