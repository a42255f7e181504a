//! Prompt templates and user-facing message builders.
//!
//! Templates use `{placeholder}` substitution. Messages that must be
//! predictable (readiness, clarification, fallbacks) are built without the
//! model.

use crate::model::ModelClient;
use serde_json::{Map, Value};
use tooling::Tool;
use tracing::warn;

/// Prompt for tool selection
pub const INTENT_PROMPT: &str = r#"You are a routing assistant that maps a user request to one of the available tools.

Available tools:
{tools}

Respond with ONLY the exact name of the single tool that fulfils the request.
If no tool fits, respond with the word unknown.

Tool name:"#;

/// Prompt for argument extraction
pub const EXTRACTION_PROMPT: &str = r#"You extract arguments for the tool "{tool}" from a user message.

Input schema (JSON Schema):
{schema}

Arguments already collected:
{collected}

Return ONLY a raw JSON object containing the arguments stated in the user message.
Use the property names from the schema. Omit anything the message does not state.
Do not guess values. Do not wrap the JSON in markdown."#;

/// Prompt for asking the next missing parameter
pub const NEXT_PARAMETER_PROMPT: &str = r#"You are helping a user fill in the arguments for the tool "{tool}" ({description}).

Already provided:
{collected}

Ask the user, in one short friendly sentence, for: {parameter}.
Do not ask for anything else."#;

/// Human label of a parameter: its schema description, else its name.
pub fn parameter_label(tool: &Tool, parameter: &str) -> String {
    tool.input_schema
        .property_description(parameter)
        .unwrap_or(parameter)
        .to_string()
}

fn render_collected(collected: &Map<String, Value>) -> String {
    if collected.is_empty() {
        return "None".to_string();
    }
    collected
        .iter()
        .map(|(k, v)| match v {
            Value::String(s) => format!("- {}: {}", k, s),
            other => format!("- {}: {}", k, other),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn intent_prompt(tools: &[Tool]) -> String {
    let listing = tools
        .iter()
        .map(|t| match t.description.as_deref() {
            Some(d) if !d.trim().is_empty() => format!("- {}: {}", t.name, d.trim()),
            _ => format!("- {}", t.name),
        })
        .collect::<Vec<_>>()
        .join("\n");
    INTENT_PROMPT.replace("{tools}", &listing)
}

pub fn extraction_prompt(tool: &Tool, collected: &Map<String, Value>) -> String {
    let schema = serde_json::to_string_pretty(&tool.input_schema).unwrap_or_else(|_| "{}".to_string());
    EXTRACTION_PROMPT
        .replace("{tool}", &tool.name)
        .replace("{schema}", &schema)
        .replace("{collected}", &render_collected(collected))
}

pub fn next_parameter_prompt(tool: &Tool, parameter: &str, collected: &Map<String, Value>) -> String {
    NEXT_PARAMETER_PROMPT
        .replace("{tool}", &tool.name)
        .replace("{description}", tool.description.as_deref().unwrap_or("no description"))
        .replace("{collected}", &render_collected(collected))
        .replace("{parameter}", &parameter_label(tool, parameter))
}

/// Deterministic request for a parameter, used when the model cannot help.
pub fn fallback_parameter_request(tool: &Tool, parameter: &str) -> String {
    format!("Please provide {}.", parameter_label(tool, parameter))
}

/// All required parameters are present.
pub fn readiness_message(tool_name: &str, collected: &Map<String, Value>) -> String {
    if collected.is_empty() {
        return format!(
            "{} doesn't need any parameters. Say \"run it\" to execute it.",
            tool_name
        );
    }
    format!(
        "I have everything needed to run {}:\n{}\nSay \"run it\" to execute it.",
        tool_name,
        render_collected(collected)
    )
}

/// No tool matched the request.
pub fn clarification_message(tools: &[Tool]) -> String {
    if tools.is_empty() {
        return "I couldn't match that to a tool, and no tools are available right now.".to_string();
    }
    let names = tools.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ");
    format!(
        "I'm not sure which tool you want to use. Available tools: {}. What would you like to do?",
        names
    )
}

/// Asks for the next missing parameter in the model's words.
pub struct ParameterPrompter {
    model: ModelClient,
    temperature: f32,
}

impl ParameterPrompter {
    pub fn new(model: ModelClient, temperature: f32) -> Self {
        Self { model, temperature }
    }

    /// Question for `parameter`. Never fails: any model error, timeouts
    /// included, falls back to [`fallback_parameter_request`].
    pub async fn ask(&self, tool: &Tool, parameter: &str, collected: &Map<String, Value>) -> String {
        let system = next_parameter_prompt(tool, parameter, collected);
        let user = format!("Ask me for {}.", parameter_label(tool, parameter));

        match self.model.complete(&system, &user, self.temperature).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                warn!(tool = %tool.name, parameter, "model returned an empty prompt");
                fallback_parameter_request(tool, parameter)
            }
            Err(e) => {
                warn!(tool = %tool.name, parameter, error = %e, "prompt generation failed");
                fallback_parameter_request(tool, parameter)
            }
        }
    }
}
