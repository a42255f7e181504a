//! The provider-agnostic chat model trait.
//!
//! Conversation components never talk to a provider directly; they hold an
//! `Arc<dyn ChatModel>` and call [`ChatModel::complete`] with a system prompt,
//! a user prompt and a temperature.

use crate::error::Result;
use crate::types::{ChatRequest, ChatResponse, Message};
use async_trait::async_trait;

/// Core trait for chat-based language models.
///
/// Implementations convert messages to their wire format, perform the call
/// and convert the reply back. They must be `Send + Sync` so a single client
/// can be shared across request handlers.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a complete chat response from messages.
    ///
    /// # Errors
    ///
    /// Transport failures, authentication errors, rate limiting and
    /// unparsable provider responses are reported as [`crate::LlmError`].
    /// Timeouts are reported as `LlmError::Timeout`.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Complete text given a system and user prompt.
    ///
    /// ```rust,ignore
    /// let answer = model.complete("Reply with one word.", "Capital of France?", 0.0).await?;
    /// ```
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let request = ChatRequest::new(vec![Message::system(system), Message::user(user)])
            .with_temperature(temperature);
        let response = self.chat(request).await?;
        Ok(response.content)
    }

    /// Check if the model/provider is reachable.
    ///
    /// Default implementation assumes availability.
    async fn is_available(&self) -> Result<bool> {
        Ok(true)
    }

    /// Short provider name for logs.
    fn provider_name(&self) -> &str;
}
