use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::traits::ChatMessage;

/// Log-probabilities of the candidate tokens for one generated position,
/// keyed by token text
pub type TokenLogprobs = BTreeMap<String, f64>;

/// Configuration for an AI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for API requests
    pub api_base: Option<String>,

    /// API key for authentication
    pub api_key: String,

    /// Default model to use with this provider
    pub default_model: String,
}

/// Body of a `/chat/completions` request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub logprobs: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_logprobs: Option<u8>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            logprobs: None,
            top_logprobs: None,
        }
    }

    /// Ask for the `top` most likely alternatives of every generated token
    pub fn with_logprobs(mut self, top: u8) -> Self {
        self.logprobs = Some(true);
        self.top_logprobs = Some(top);
        self
    }
}

/// Parsed response of a `/chat/completions` call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: ResponseMessage,

    #[serde(default)]
    pub logprobs: Option<ChoiceLogprobs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,

    #[serde(default)]
    pub content: Option<String>,
}

/// Log-probability payload of a choice.
///
/// Chat endpoints report per-token entries under `content`; older
/// completion-style endpoints report one token→logprob map per position under
/// `top_logprobs`. Either is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChoiceLogprobs {
    #[serde(default)]
    pub content: Option<Vec<TokenLogprob>>,

    #[serde(default)]
    pub top_logprobs: Option<Vec<TokenLogprobs>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenLogprob {
    pub token: String,
    pub logprob: f64,

    #[serde(default)]
    pub top_logprobs: Vec<TopLogprob>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopLogprob {
    pub token: String,
    pub logprob: f64,
}

impl ChatCompletion {
    /// Build a completion with a single text choice
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            model: None,
            choices: vec![Choice {
                message: ResponseMessage {
                    role: Some("assistant".to_string()),
                    content: Some(content.into()),
                },
                logprobs: None,
            }],
        }
    }

    /// Text of the first choice, if the endpoint returned one
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first()?.message.content.as_deref()
    }

    /// Candidate tokens for the first generated position of the first choice
    pub fn first_token_logprobs(&self) -> Option<TokenLogprobs> {
        let logprobs = self.choices.first()?.logprobs.as_ref()?;

        if let Some(first) = logprobs.content.as_ref().and_then(|c| c.first()) {
            let mut map: TokenLogprobs = first
                .top_logprobs
                .iter()
                .map(|top| (top.token.clone(), top.logprob))
                .collect();
            // The sampled token is always a candidate even without alternatives.
            map.entry(first.token.clone()).or_insert(first.logprob);
            return Some(map);
        }

        logprobs.top_logprobs.as_ref()?.first().cloned()
    }
}
