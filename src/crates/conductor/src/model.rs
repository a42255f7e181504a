//! Language-model access for the conversation components.
//!
//! [`build_chat_model`] turns the `[llm]` settings into a provider client and
//! [`ModelClient`] puts every completion under the configured deadline.

use crate::config::LlmSettings;
use crate::error::{ConfigError, ConversationError, Result};
use llm::local::OllamaClient;
use llm::remote::OpenAiClient;
use llm::{ChatModel, LlmError, LocalLlmConfig, RemoteLlmConfig};
use std::sync::Arc;
use std::time::Duration;
use tooling::async_utils::with_timeout;
use tracing::debug;

const OLLAMA_BASE: &str = "http://localhost:11434";
const OPENAI_BASE: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE: &str = "https://openrouter.ai/api/v1";
const GROQ_BASE: &str = "https://api.groq.com/openai/v1";

/// Create the chat model described by `settings`.
///
/// `ollama` talks to a local server; `openai`, `openrouter` and `groq` use
/// their public endpoints unless `api_base` says otherwise. Any other
/// provider name is treated as OpenAI-compatible and needs an `api_base`.
pub fn build_chat_model(settings: &LlmSettings) -> std::result::Result<Arc<dyn ChatModel>, ConfigError> {
    let provider = settings.provider.trim().to_lowercase();

    if provider == "ollama" {
        let config = LocalLlmConfig::new(
            settings.api_base.clone().unwrap_or_else(|| OLLAMA_BASE.to_string()),
            settings.model.clone(),
        )
        .with_timeout(settings.timeout());
        let client = OllamaClient::new(config).map_err(llm_config_error)?;
        return Ok(Arc::new(client));
    }

    let default_base = match provider.as_str() {
        "openai" => Some(OPENAI_BASE),
        "openrouter" => Some(OPENROUTER_BASE),
        "groq" => Some(GROQ_BASE),
        _ => None,
    };
    let base_url = settings
        .api_base
        .clone()
        .or_else(|| default_base.map(str::to_string))
        .ok_or_else(|| {
            ConfigError::Invalid(format!(
                "LLM provider '{}' needs llm.api_base (built in: ollama, openai, openrouter, groq)",
                settings.provider
            ))
        })?;

    let api_key = settings
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ConfigError::Invalid(format!("{} API key not configured", settings.provider)))?;
    if api_key.contains("${") {
        return Err(ConfigError::Invalid(format!(
            "{} API key references an unset environment variable",
            settings.provider
        )));
    }

    let config = RemoteLlmConfig::new(api_key, base_url, settings.model.clone()).with_timeout(settings.timeout());
    let client = OpenAiClient::new(config).map_err(llm_config_error)?;
    Ok(Arc::new(client))
}

fn llm_config_error(err: LlmError) -> ConfigError {
    ConfigError::Invalid(format!("language model client: {}", err))
}

/// Shared chat model with a per-call deadline.
#[derive(Clone)]
pub struct ModelClient {
    inner: Arc<dyn ChatModel>,
    timeout: Duration,
}

impl ModelClient {
    pub fn new(inner: Arc<dyn ChatModel>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    /// Whether the provider answers within the deadline. Errors count as
    /// unreachable.
    pub async fn is_available(&self) -> bool {
        match with_timeout(self.timeout, self.inner.is_available()).await {
            Ok(available) => available,
            Err(e) => {
                debug!(provider = self.provider_name(), error = %e, "availability check failed");
                false
            }
        }
    }

    /// Complete `user` under `system`.
    ///
    /// # Errors
    ///
    /// `Timeout` when the deadline passes (or the provider reports one),
    /// `Model` for every other provider failure.
    pub async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        debug!(provider = self.provider_name(), temperature, "model completion");
        let timeout = self.timeout;
        with_timeout(timeout, self.inner.complete(system, user, temperature))
            .await
            .map_err(|e| {
                e.flatten(|d| LlmError::Timeout(format!("no response within {:?}", d)))
            })
            .map_err(|e| match e {
                e if e.is_timeout() => ConversationError::Timeout {
                    operation: "model completion".to_string(),
                    duration: timeout,
                },
                e => ConversationError::Model(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use llm::{ChatRequest, ChatResponse};

    struct StalledModel;

    #[async_trait]
    impl ChatModel for StalledModel {
        async fn chat(&self, _request: ChatRequest) -> llm::Result<ChatResponse> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(ChatResponse::text("late"))
        }

        fn provider_name(&self) -> &str {
            "stalled"
        }
    }

    struct OfflineModel;

    #[async_trait]
    impl ChatModel for OfflineModel {
        async fn chat(&self, _request: ChatRequest) -> llm::Result<ChatResponse> {
            Err(LlmError::ServiceUnavailable("connection refused".into()))
        }

        async fn is_available(&self) -> llm::Result<bool> {
            Ok(false)
        }

        fn provider_name(&self) -> &str {
            "offline"
        }
    }

    struct FailingModel(fn() -> LlmError);

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn chat(&self, _request: ChatRequest) -> llm::Result<ChatResponse> {
            Err((self.0)())
        }

        fn provider_name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_maps_to_timeout() {
        let client = ModelClient::new(Arc::new(StalledModel), Duration::from_secs(5));
        let err = client.complete("s", "u", 0.0).await.unwrap_err();
        match err {
            ConversationError::Timeout { operation, duration } => {
                assert_eq!(operation, "model completion");
                assert_eq!(duration, Duration::from_secs(5));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_availability() {
        let client = ModelClient::new(Arc::new(OfflineModel), Duration::from_secs(5));
        assert!(!client.is_available().await);

        let client = ModelClient::new(Arc::new(StalledModel), Duration::from_secs(5));
        assert!(client.is_available().await);
    }

    #[tokio::test]
    async fn test_provider_errors() {
        let client = ModelClient::new(
            Arc::new(FailingModel(|| LlmError::Timeout("read".into()))),
            Duration::from_secs(5),
        );
        assert!(matches!(
            client.complete("s", "u", 0.0).await,
            Err(ConversationError::Timeout { .. })
        ));

        let client = ModelClient::new(
            Arc::new(FailingModel(|| LlmError::ServiceUnavailable("502".into()))),
            Duration::from_secs(5),
        );
        assert!(matches!(
            client.complete("s", "u", 0.0).await,
            Err(ConversationError::Model(_))
        ));
    }

    fn settings(provider: &str) -> LlmSettings {
        LlmSettings {
            provider: provider.to_string(),
            ..LlmSettings::default()
        }
    }

    #[test]
    fn test_build_ollama_without_key() {
        let model = build_chat_model(&settings("ollama")).unwrap();
        assert_eq!(model.provider_name(), "ollama");
    }

    #[test]
    fn test_build_remote_requires_key() {
        let err = build_chat_model(&settings("openai")).err().unwrap();
        assert!(err.to_string().contains("API key"));

        let mut s = settings("openai");
        s.api_key = Some("${CONDUCTOR_TEST_NEVER_SET_KEY}".to_string());
        assert!(build_chat_model(&s).is_err());

        s.api_key = Some("sk-test".to_string());
        assert!(build_chat_model(&s).is_ok());
    }

    #[test]
    fn test_unknown_provider_needs_base() {
        let mut s = settings("together");
        s.api_key = Some("key".to_string());
        let err = build_chat_model(&s).err().unwrap();
        assert!(err.to_string().contains("api_base"));

        s.api_base = Some("https://api.together.xyz/v1".to_string());
        assert!(build_chat_model(&s).is_ok());
    }
}
