//! Required-parameter bookkeeping.

use serde_json::{Map, Value};
use tooling::ToolSchema;

/// Whether a collected value counts as not provided: absent, null or blank.
pub fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Required parameters of `schema` not yet present in `inputs`, in the
/// schema's `required` order. Without a schema nothing is missing.
pub fn missing_parameters(schema: Option<&ToolSchema>, inputs: &Map<String, Value>) -> Vec<String> {
    let Some(schema) = schema else {
        return Vec::new();
    };

    schema
        .required
        .iter()
        .filter(|name| is_missing(inputs.get(name.as_str())))
        .cloned()
        .collect()
}
