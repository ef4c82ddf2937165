use async_trait::async_trait;
use reqwest::Client;

use crate::models::{ChatCompletion, ChatCompletionRequest, ProviderConfig};
use crate::traits::CompletionApi;

/// Base URL used when no endpoint is configured
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat completion provider
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::new();
        Self { config, client }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Full URL of the chat completions endpoint
    pub fn endpoint(&self) -> String {
        let api_base = self.config.api_base.as_deref().unwrap_or(DEFAULT_API_BASE);
        format!("{}/chat/completions", api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionApi for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn chat_completion(&self, request: &ChatCompletionRequest) -> anyhow::Result<ChatCompletion> {
        let endpoint = self.endpoint();

        // Fall back to the configured model if the caller left it blank
        let mut payload = request.clone();
        if payload.model.is_empty() {
            payload.model = self.config.default_model.clone();
        }

        tracing::debug!("Making API call to {} with model {}", endpoint, payload.model);
        tracing::trace!(
            "API request payload: {}",
            serde_json::to_string(&payload).unwrap_or_else(|_| format!("{:?}", payload))
        );

        let response = self.client
            .post(&endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();

        // Get the raw response text first for better error handling
        let response_text = response.text().await?;
        tracing::debug!("Raw API response ({}): {}", status, response_text);

        parse_chat_response(&response_text)
    }
}

/// Interpret the body of a `/chat/completions` response
pub fn parse_chat_response(response_text: &str) -> anyhow::Result<ChatCompletion> {
    let data = match serde_json::from_str::<serde_json::Value>(response_text) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to parse API response as JSON: {:?}", e);
            return Err(anyhow::anyhow!("API returned non-JSON response: {}", e));
        }
    };

    // Check for API errors
    if let Some(error) = data.get("error") {
        tracing::error!("API returned error: {:?}", error);
        let error_message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(anyhow::anyhow!("API error: {}", error_message));
    }

    if data.get("choices").and_then(|c| c.as_array()).is_none() {
        tracing::error!("Response missing 'choices' array: {:?}", data);
        return Err(anyhow::anyhow!("Response missing 'choices' array"));
    }

    let completion: ChatCompletion = serde_json::from_value(data)?;
    if completion.choices.is_empty() {
        tracing::error!("API returned empty choices array");
        return Err(anyhow::anyhow!("No completions returned"));
    }

    Ok(completion)
}
