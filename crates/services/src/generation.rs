use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// Opaque text-in/text-out model call.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` when the generator is disabled or the call
    /// fails.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// Like `generate`, but every failure becomes `None` after being logged.
    ///
    /// Callers use this to fall back to placeholder content.
    async fn generate_text(&self, prompt: &str) -> Option<String> {
        match self.generate(prompt).await {
            Ok(text) => Some(text),
            Err(GenerationError::Disabled) => {
                tracing::debug!("text generation disabled, using placeholder content");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "text generation failed, using placeholder content");
                None
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl GenerationConfig {
    /// Read the generator settings from the environment.
    ///
    /// Returns `None` when `LESSON_AI_API_KEY` is unset or blank.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("LESSON_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("LESSON_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("LESSON_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Chat-completions client; disabled when constructed without a config.
#[derive(Clone)]
pub struct GenerationService {
    client: Client,
    config: Option<GenerationConfig>,
}

impl GenerationService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(GenerationConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<GenerationConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.config.as_ref().map(|config| config.model.as_str())
    }
}

#[async_trait]
impl TextGenerator for GenerationService {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let config = self
            .config
            .as_ref()
            .ok_or(GenerationError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: 0.2,
        };

        tracing::debug!(model = %config.model, prompt_chars = prompt.len(), "requesting completion");
        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GenerationError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        Ok(content.trim().to_string())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_service_reports_disabled() {
        let service = GenerationService::new(None);
        assert!(!service.enabled());
        let err = service.generate("hello").await.unwrap_err();
        assert!(matches!(err, GenerationError::Disabled));
        assert!(service.generate_text("hello").await.is_none());
    }

    #[tokio::test]
    async fn unreachable_endpoint_falls_back_to_none() {
        let service = GenerationService::new(Some(GenerationConfig {
            base_url: "http://127.0.0.1:9".into(),
            api_key: "test".into(),
            model: "test-model".into(),
        }));
        assert_eq!(service.model(), Some("test-model"));
        assert!(service.generate_text("hello").await.is_none());
    }

    #[test]
    fn parses_chat_response_shape() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  Q: hi  "}}]}"#,
        )
        .unwrap();
        assert_eq!(
            body.choices[0].message.content.as_deref(),
            Some("  Q: hi  ")
        );
    }
}
