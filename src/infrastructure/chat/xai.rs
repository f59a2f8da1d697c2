use crate::domain::error::DomainError;
use crate::domain::ports::chat_provider::{ChatMessage, ChatProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);
const MODELS_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_TOKENS: u32 = 1000;
const TEMPERATURE: f64 = 0.7;

/// xAI chat-completions client (OpenAI-compatible wire format).
pub struct XaiChatProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

impl XaiChatProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Build from `XAI_API_KEY`; `None` when unset or blank.
    pub fn from_env() -> Option<Self> {
        std::env::var("XAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(Self::new)
    }
}

#[async_trait::async_trait]
impl ChatProvider for XaiChatProvider {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, DomainError> {
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(COMPLETION_TIMEOUT)
            .json(&CompletionRequest {
                model,
                messages,
                max_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
            })
            .send()
            .await
            .map_err(|e| DomainError::Chat(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::Chat(format!("API returned {status}: {body}")));
        }

        let result: CompletionResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(format!("chat response: {e}")))?;
        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| DomainError::Chat("No response from Grok API".into()))
    }

    async fn list_models(&self) -> Result<Vec<String>, DomainError> {
        let resp = self
            .client
            .get(format!("{}/models", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(MODELS_TIMEOUT)
            .send()
            .await
            .map_err(|e| DomainError::Chat(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(DomainError::Chat(format!("models endpoint returned {}", resp.status())));
        }

        let result: ModelsResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(format!("models response: {e}")))?;
        Ok(result.data.into_iter().map(|m| m.id).collect())
    }
}
