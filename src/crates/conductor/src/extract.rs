//! Structured argument extraction from free text.
//!
//! The model's answer is untrusted: it is parsed as JSON and passed through
//! the tool's partial validator, so only declared fields with acceptable
//! values come back. Anything unusable is logged and treated as "no new
//! parameters".

use crate::error::{ConversationError, Result};
use crate::model::ModelClient;
use crate::prompts::extraction_prompt;
use crate::validation::ValidatorRegistry;
use serde_json::{Map, Value};
use std::sync::Arc;
use tooling::Tool;
use tracing::{debug, warn};

pub struct ParameterExtractor {
    model: ModelClient,
    registry: Arc<ValidatorRegistry>,
    temperature: f32,
}

impl ParameterExtractor {
    pub fn new(model: ModelClient, registry: Arc<ValidatorRegistry>, temperature: f32) -> Self {
        Self {
            model,
            registry,
            temperature,
        }
    }

    /// Use `registry` for validation instead of the one given at construction.
    pub fn with_registry(mut self, registry: Arc<ValidatorRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Arguments for `tool` stated in `utterance`.
    ///
    /// # Errors
    ///
    /// Only model failures and timeouts. Parse and validation problems
    /// yield an empty map.
    pub async fn extract(
        &self,
        utterance: &str,
        tool: &Tool,
        collected: &Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let answer = self
            .model
            .complete(&extraction_prompt(tool, collected), utterance, self.temperature)
            .await?;

        match self.interpret(&answer, tool) {
            Ok(values) => {
                debug!(tool = %tool.name, fields = ?values.keys().collect::<Vec<_>>(), "extracted parameters");
                Ok(values)
            }
            Err(e) => {
                warn!(tool = %tool.name, error = %e, "discarding extraction");
                Ok(Map::new())
            }
        }
    }

    /// Parse and validate a raw model answer.
    pub fn interpret(&self, answer: &str, tool: &Tool) -> Result<Map<String, Value>> {
        let raw = parse_json_object(answer)?;
        self.registry
            .build(&tool.input_schema)
            .validate_partial(&raw)
            .map_err(|e| ConversationError::ExtractionParse(e.to_string()))
    }
}

/// The JSON object in a model answer, tolerating markdown fences and prose
/// around it.
fn parse_json_object(answer: &str) -> Result<Map<String, Value>> {
    let trimmed = answer.trim();
    let body = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => {
            return Err(ConversationError::ExtractionParse(
                "no JSON object in model answer".to_string(),
            ))
        }
    };

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ConversationError::ExtractionParse(
            "model answer is not a JSON object".to_string(),
        )),
        Err(e) => Err(ConversationError::ExtractionParse(e.to_string())),
    }
}
