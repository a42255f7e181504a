//! Tool selection from a free-text request.

use crate::error::Result;
use crate::model::ModelClient;
use crate::prompts::intent_prompt;
use tooling::Tool;
use tracing::{debug, info, warn};

/// Picks the tool a user is asking for.
pub struct IntentDetector {
    model: ModelClient,
    temperature: f32,
}

impl IntentDetector {
    pub fn new(model: ModelClient, temperature: f32) -> Self {
        Self { model, temperature }
    }

    /// Name of the requested tool, in the catalog's spelling.
    ///
    /// `Ok(None)` when the model answers `unknown` or something that is not a
    /// catalog tool. An empty catalog is answered without calling the model.
    ///
    /// # Errors
    ///
    /// Model failures and timeouts.
    pub async fn detect(&self, utterance: &str, tools: &[Tool]) -> Result<Option<String>> {
        if tools.is_empty() {
            debug!("no tools available, skipping intent detection");
            return Ok(None);
        }

        let answer = self
            .model
            .complete(&intent_prompt(tools), utterance, self.temperature)
            .await?;

        match Self::match_answer(&answer, tools) {
            Some(name) => {
                info!(tool = %name, "intent detected");
                Ok(Some(name.to_string()))
            }
            None => {
                if !Self::clean(&answer).eq_ignore_ascii_case("unknown") {
                    warn!(answer = %answer.trim(), "model named a tool that does not exist");
                }
                Ok(None)
            }
        }
    }

    fn clean(answer: &str) -> &str {
        let first_line = answer.trim().lines().next().unwrap_or("");
        first_line.trim_matches(|c: char| {
            c.is_whitespace() || matches!(c, '"' | '\'' | '`' | '.' | ',' | ':' | ';' | '!' | '?' | '*')
        })
    }

    /// Match a raw model answer against the catalog.
    pub fn match_answer<'a>(answer: &str, tools: &'a [Tool]) -> Option<&'a str> {
        let cleaned = Self::clean(answer);
        if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("unknown") {
            return None;
        }
        tools
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(cleaned))
            .map(|t| t.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tooling::ToolSchema;

    fn tools() -> Vec<Tool> {
        vec![
            Tool::new("create_repo", Some("creates a new repository"), ToolSchema::default()),
            Tool::new("Deploy_Contract", None, ToolSchema::default()),
        ]
    }

    #[test]
    fn test_answer_cleanup() {
        let tools = tools();
        assert_eq!(IntentDetector::match_answer("create_repo", &tools), Some("create_repo"));
        assert_eq!(
            IntentDetector::match_answer("  \"deploy_contract\".\n", &tools),
            Some("Deploy_Contract")
        );
        assert_eq!(IntentDetector::match_answer("`CREATE_REPO`", &tools), Some("create_repo"));
    }

    #[test]
    fn test_unknown_and_invented_names() {
        let tools = tools();
        assert_eq!(IntentDetector::match_answer("unknown", &tools), None);
        assert_eq!(IntentDetector::match_answer("Unknown.", &tools), None);
        assert_eq!(IntentDetector::match_answer("delete_repo", &tools), None);
        assert_eq!(IntentDetector::match_answer("", &tools), None);
        assert_eq!(
            IntentDetector::match_answer("I think create_repo fits", &tools),
            None
        );
    }
}
