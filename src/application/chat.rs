//! Conversational advisor session on top of a hosted chat model.

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::chat_provider::{ChatMessage, ChatProvider, ChatRole};

pub const DEFAULT_MODEL: &str = "grok-4-0709";

/// Models offered when the provider cannot list its own.
pub const FALLBACK_MODELS: [&str; 4] = ["grok-4-0709", "grok-3", "grok-2-latest", "grok-2"];

/// History messages sent along with each prompt.
const CONTEXT_MESSAGES: usize = 10;

const SYSTEM_PROMPT: &str =
    "You are an expert Financial Advisor to help me maximize my shares using covered calls strategy";

pub struct ChatSession {
    provider: Option<Arc<dyn ChatProvider>>,
    model: String,
    system: ChatMessage,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    /// Without a provider the session answers with canned mock replies.
    pub fn new(provider: Option<Arc<dyn ChatProvider>>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            system: ChatMessage::new(ChatRole::System, SYSTEM_PROMPT),
            history: Vec::new(),
        }
    }

    pub fn is_mock(&self) -> bool {
        self.provider.is_none()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Send `input` and return the reply. Provider failures come back as the
    /// reply text; both turns are kept in history either way.
    pub async fn prompt(&mut self, input: &str) -> String {
        self.history.push(ChatMessage::new(ChatRole::User, input));

        let reply = match &self.provider {
            None => format!(
                "Grok (Mock): I understand you said '{input}'. \
                 Please set your XAI_API_KEY to get real responses."
            ),
            Some(provider) => {
                let start = self.history.len().saturating_sub(CONTEXT_MESSAGES);
                let mut messages = Vec::with_capacity(CONTEXT_MESSAGES + 1);
                messages.push(self.system.clone());
                messages.extend_from_slice(&self.history[start..]);

                match provider.complete(&self.model, &messages).await {
                    Ok(text) => text,
                    Err(e) => format!("Error calling xAI API: {e}"),
                }
            }
        };

        self.history.push(ChatMessage::new(ChatRole::Assistant, reply.clone()));
        reply
    }

    /// Models from the provider, or [`FALLBACK_MODELS`] in mock mode, on
    /// error, or when the provider lists none.
    pub async fn available_models(&self) -> Vec<String> {
        let fallback = || FALLBACK_MODELS.iter().map(|m| m.to_string()).collect();
        let Some(provider) = &self.provider else {
            return fallback();
        };
        match provider.list_models().await {
            Ok(models) if !models.is_empty() => models,
            Ok(_) => fallback(),
            Err(e) => {
                warn!(error = %e, "error fetching models, using defaults");
                fallback()
            }
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

/// `preferred` if listed, else the newest known model that is, else the
/// first listed.
pub fn pick_default_model(preferred: &str, available: &[String]) -> String {
    if available.iter().any(|m| m == preferred) {
        return preferred.to_string();
    }
    FALLBACK_MODELS
        .iter()
        .find(|m| available.iter().any(|a| a == *m))
        .map(|m| m.to_string())
        .or_else(|| available.first().cloned())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// A console line interpreted as a session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Exit,
    Clear,
    Model,
    Prompt(String),
    Empty,
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => ConsoleCommand::Empty,
            "exit" | "quit" => ConsoleCommand::Exit,
            "clear" => ConsoleCommand::Clear,
            "model" => ConsoleCommand::Model,
            _ => ConsoleCommand::Prompt(trimmed.to_string()),
        }
    }
}
