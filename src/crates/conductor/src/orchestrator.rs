//! One conversation turn, end to end.
//!
//! The orchestrator owns no conversation data. Each call recovers the state
//! from the message history, advances it by one user utterance and returns a
//! single assistant message carrying the new state.

use crate::config::LlmSettings;
use crate::error::{ConversationError, Result};
use crate::extract::ParameterExtractor;
use crate::intent::IntentDetector;
use crate::message::{ConversationRequest, Message};
use crate::missing::missing_parameters;
use crate::model::ModelClient;
use crate::pending::PendingSwitchResolver;
use crate::prompts::{clarification_message, readiness_message, ParameterPrompter};
use crate::state::ConversationState;
use crate::switch::{ContextSwitchDetector, SwitchDecision};
use crate::validation::ValidatorRegistry;
use serde_json::{Map, Value};
use std::sync::Arc;
use tooling::{Tool, ToolCatalog};
use tracing::{debug, info, warn};

pub struct ConversationOrchestrator {
    catalog: ToolCatalog,
    intent: IntentDetector,
    extractor: ParameterExtractor,
    switch: ContextSwitchDetector,
    pending: PendingSwitchResolver,
    prompter: ParameterPrompter,
}

impl ConversationOrchestrator {
    /// Build with the default validators and switch heuristic.
    pub fn new(catalog: ToolCatalog, model: ModelClient, settings: &LlmSettings) -> Self {
        let registry = Arc::new(ValidatorRegistry::default());
        Self {
            catalog,
            intent: IntentDetector::new(model.clone(), settings.classification_temperature),
            extractor: ParameterExtractor::new(model.clone(), registry, settings.classification_temperature),
            switch: ContextSwitchDetector::default(),
            pending: PendingSwitchResolver,
            prompter: ParameterPrompter::new(model, settings.prompting_temperature),
        }
    }

    pub fn with_registry(mut self, registry: ValidatorRegistry) -> Self {
        self.extractor = self.extractor.with_registry(Arc::new(registry));
        self
    }

    pub fn with_switch_detector(mut self, detector: ContextSwitchDetector) -> Self {
        self.switch = detector;
        self
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Handle one request.
    ///
    /// # Errors
    ///
    /// `BadRequest` before any upstream call, `ProviderUnavailable` when the
    /// catalog cannot be fetched (or a tool provider session cannot be
    /// opened), `Timeout` and `Model` for catalog and model failures. Every
    /// other failure becomes an assistant message.
    pub async fn handle(&self, request: &ConversationRequest) -> Result<Message> {
        let utterance = request.latest_user_message()?;
        let tools = self.catalog.list_tools().await?;
        let state = ConversationState::recover(&request.messages);
        debug!(
            tool = ?state.tool_name,
            pending = state.context_state_pending,
            collected = state.collected_inputs.len(),
            "recovered conversation state"
        );

        let current = match state.tool_name.as_deref() {
            Some(name) => match ToolCatalog::find_tool(&tools, name) {
                Some(tool) => Some(tool),
                None => {
                    let err = ConversationError::ToolNotFound(name.to_string());
                    warn!(error = %err, "resetting conversation state");
                    return Ok(reply(
                        format!(
                            "The tool {} is no longer available, so I've cleared this request. What would you like to do?",
                            name
                        ),
                        &ConversationState::default(),
                    ));
                }
            },
            None => None,
        };
        let missing = missing_parameters(current.map(|t| &t.input_schema), &state.collected_inputs);

        if state.context_state_pending {
            let resolution = self.pending.resolve(utterance, &state, &missing, &tools);
            return Ok(reply(resolution.message, &resolution.state));
        }

        let (tool, state) = match current {
            Some(tool) => match self.switch.evaluate(utterance, &state, &missing, &tools) {
                SwitchDecision::Execute { tool: name, arguments } => {
                    return self.execute(tool, &name, arguments).await;
                }
                SwitchDecision::Propose { message, state } => return Ok(reply(message, &state)),
                SwitchDecision::Continue { mut state } => {
                    let extracted = self
                        .extractor
                        .extract(utterance, tool, &state.collected_inputs)
                        .await?;
                    merge_inputs(&mut state.collected_inputs, extracted);
                    (tool, state)
                }
                SwitchDecision::PassThrough => return self.start(utterance, &tools).await,
            },
            None => return self.start(utterance, &tools).await,
        };

        self.advance(tool, state).await
    }

    /// No tool yet: detect one and extract from the opening utterance.
    async fn start(&self, utterance: &str, tools: &[Tool]) -> Result<Message> {
        let Some(name) = self.intent.detect(utterance, tools).await? else {
            debug!("no intent detected");
            return Ok(reply(clarification_message(tools), &ConversationState::default()));
        };
        let Some(tool) = ToolCatalog::find_tool(tools, &name) else {
            return Ok(reply(clarification_message(tools), &ConversationState::default()));
        };

        let mut state = ConversationState::for_tool(tool.name.clone());
        let extracted = self.extractor.extract(utterance, tool, &state.collected_inputs).await?;
        merge_inputs(&mut state.collected_inputs, extracted);
        self.advance(tool, state).await
    }

    /// Report readiness or ask for the next missing parameter.
    async fn advance(&self, tool: &Tool, mut state: ConversationState) -> Result<Message> {
        let missing = missing_parameters(Some(&tool.input_schema), &state.collected_inputs);
        match missing.first() {
            None => {
                state.finished = true;
                debug!(tool = %tool.name, "all required parameters collected");
                Ok(reply(readiness_message(&tool.name, &state.collected_inputs), &state))
            }
            Some(next) => {
                state.finished = false;
                debug!(tool = %tool.name, missing = ?missing, "asking for next parameter");
                let question = self.prompter.ask(tool, next, &state.collected_inputs).await;
                Ok(reply(question, &state))
            }
        }
    }

    /// Validate and run. The state resets whatever happens, except when the
    /// provider cannot be reached at all.
    async fn execute(&self, tool: &Tool, name: &str, arguments: Map<String, Value>) -> Result<Message> {
        let reset = ConversationState::default();

        let validator = self.extractor.registry().build(&tool.input_schema);
        let arguments = match validator.validate_full(&arguments) {
            Ok(arguments) => arguments,
            Err(e) => {
                warn!(tool = name, error = %e, "collected arguments failed validation");
                return Ok(reply(format!("I couldn't run {}: {}.", name, e), &reset));
            }
        };

        match self.catalog.invoke(&tool.name, arguments).await.map_err(ConversationError::from) {
            Ok(output) => {
                info!(tool = name, "tool executed");
                let text = if output.text.trim().is_empty() {
                    format!("{} completed.", name)
                } else {
                    format!("{} completed:\n{}", name, output.text.trim())
                };
                Ok(reply(text, &reset))
            }
            Err(e @ ConversationError::ProviderUnavailable(_)) => Err(e),
            Err(e) => {
                warn!(tool = name, error = %e, "tool execution failed");
                Ok(reply(format!("I couldn't run {}: {}", name, e), &reset))
            }
        }
    }
}

fn reply(content: impl Into<String>, state: &ConversationState) -> Message {
    Message::assistant(content).with_annotation(state.to_annotation())
}

/// Extraction results overwrite earlier values.
fn merge_inputs(collected: &mut Map<String, Value>, extracted: Map<String, Value>) {
    for (key, value) in extracted {
        collected.insert(key, value);
    }
}
