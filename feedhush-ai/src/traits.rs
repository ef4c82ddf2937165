use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{ChatCompletion, ChatCompletionRequest};

/// A single chat turn as sent to the completion endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Remote function that turns a chat request into a completion
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn chat_completion(&self, request: &ChatCompletionRequest) -> anyhow::Result<ChatCompletion>;
}
