//! Conversation state carried between turns in message annotations.
//!
//! The service keeps no sessions. Each assistant reply carries a
//! `"tool-input-state"` annotation and the client sends it back with the
//! message history; the most recent one is authoritative.

use crate::message::Message;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

/// Annotation `type` tag of the state snapshot.
pub const TOOL_INPUT_STATE: &str = "tool-input-state";

/// Partial tool-call state of a conversation.
///
/// Invariants: `context_state_pending` implies `tool_pending` is set and
/// `tool_name` still names the pre-switch tool; `finished` implies no
/// required parameter of `tool_name` is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    #[serde(default)]
    pub tool_name: Option<String>,

    #[serde(default)]
    pub collected_inputs: Map<String, Value>,

    #[serde(default)]
    pub finished: bool,

    #[serde(default)]
    pub context_state_pending: bool,

    #[serde(default)]
    pub tool_pending: Option<String>,
}

impl ConversationState {
    /// Fresh state targeting `tool`.
    pub fn for_tool(tool: impl Into<String>) -> Self {
        Self {
            tool_name: Some(tool.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Recover the latest state snapshot from the message history.
    ///
    /// Messages and their annotations are scanned newest first. A malformed
    /// latest snapshot yields an empty state rather than an older one.
    pub fn recover(messages: &[Message]) -> Self {
        let latest = messages
            .iter()
            .rev()
            .flat_map(|m| m.annotations.iter().rev())
            .find(|a| a.get("type").and_then(Value::as_str) == Some(TOOL_INPUT_STATE));

        match latest {
            Some(annotation) => match serde_json::from_value::<Self>(annotation.clone()) {
                Ok(state) => state,
                Err(e) => {
                    warn!(error = %e, "discarding unreadable tool-input-state annotation");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    /// Wire form: the state fields plus `type: "tool-input-state"`.
    pub fn to_annotation(&self) -> Value {
        let mut value = serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()));
        if let Value::Object(obj) = &mut value {
            obj.insert("type".to_string(), Value::String(TOOL_INPUT_STATE.to_string()));
        }
        value
    }
}
