//! Tool descriptions as advertised by a provider.
//!
//! Schemas come from outside the process (MCP servers, configuration files),
//! so parsing is lenient: a fragment with the wrong shape is dropped instead of
//! failing the whole tool list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Unique name within a catalog.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "inputSchema", default)]
    pub input_schema: ToolSchema,
}

impl Tool {
    pub fn new(name: impl Into<String>, description: Option<&str>, input_schema: ToolSchema) -> Self {
        Self {
            name: name.into(),
            description: description.map(str::to_string),
            input_schema,
        }
    }
}

/// JSON-Schema-like object description of a tool's arguments.
///
/// Only the subset the conversation engine relies on is modelled: a map of
/// property fragments and the ordered list of required names. Property
/// fragments are kept as raw JSON and interpreted by the validator builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ToolSchema {
    #[serde(rename = "type")]
    pub schema_type: String,

    #[serde(skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl Default for ToolSchema {
    fn default() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }
}

impl ToolSchema {
    /// Schema with the given properties and required names.
    pub fn object(properties: Map<String, Value>, required: &[&str]) -> Self {
        let mut names: Vec<String> = Vec::new();
        for name in required {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        Self {
            schema_type: "object".to_string(),
            properties,
            required: names,
        }
    }

    /// Raw fragment of a declared property.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    /// `description` of a declared property, if it is a non-empty string.
    pub fn property_description(&self, name: &str) -> Option<&str> {
        self.properties
            .get(name)
            .and_then(|p| p.get("description"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }
}

impl From<Value> for ToolSchema {
    fn from(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return ToolSchema::default();
        };

        let schema_type = obj
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("object")
            .to_string();

        let properties = match obj.remove("properties") {
            Some(Value::Object(props)) => props,
            _ => Map::new(),
        };

        let mut required: Vec<String> = Vec::new();
        if let Some(Value::Array(names)) = obj.get("required") {
            for name in names.iter().filter_map(Value::as_str) {
                if !required.iter().any(|r| r == name) {
                    required.push(name.to_string());
                }
            }
        }

        Self {
            schema_type,
            properties,
            required,
        }
    }
}
