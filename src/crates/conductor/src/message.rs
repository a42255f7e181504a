//! Chat messages exchanged with the client.

use crate::error::{ConversationError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A message as sent by the client and returned by the service.
///
/// Annotations are kept as raw JSON so kinds this service does not know about
/// survive a round trip through the client untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,

    pub content: String,

    /// Milliseconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Value>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Some(chrono::Utc::now().timestamp_millis()),
            annotations: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Some(chrono::Utc::now().timestamp_millis()),
            annotations: Vec::new(),
        }
    }

    pub fn with_annotation(mut self, annotation: Value) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Body of `POST /conversation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRequest {
    pub messages: Vec<Message>,
}

impl ConversationRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }

    /// Parse a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| ConversationError::BadRequest(format!("malformed request body: {}", e)))
    }

    /// Content of the most recent user message.
    ///
    /// # Errors
    ///
    /// `BadRequest` when there are no messages, no user message, or the
    /// latest user message is blank.
    pub fn latest_user_message(&self) -> Result<&str> {
        if self.messages.is_empty() {
            return Err(ConversationError::BadRequest(
                "messages must not be empty".to_string(),
            ));
        }

        let content = self
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.trim())
            .ok_or_else(|| ConversationError::BadRequest("no user message found".to_string()))?;

        if content.is_empty() {
            return Err(ConversationError::BadRequest(
                "latest user message is empty".to_string(),
            ));
        }
        Ok(content)
    }
}
