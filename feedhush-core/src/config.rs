// File: src/config.rs

use std::fmt;
use std::sync::Arc;

use feedhush_ai::CompletionApi;

/// Model used when the options don't name one.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0125";

/// Threshold used when the stored value is missing or out of range.
pub const DEFAULT_HIDE_THRESHOLD: f64 = 0.5;

/// Everything a decision needs, loaded once per page and read-only afterwards.
#[derive(Clone)]
pub struct FilterConfig {
    pub client: Arc<dyn CompletionApi>,
    pub model: String,
    pub prompt_template: String,
    pub prompt_instructions: String,
    /// Minimum no-probability for the log-probability strategy to hide a post.
    pub hide_threshold: f64,
}

impl fmt::Debug for FilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterConfig")
            .field("client", &self.client.name())
            .field("model", &self.model)
            .field("prompt_template", &self.prompt_template)
            .field("prompt_instructions", &self.prompt_instructions)
            .field("hide_threshold", &self.hide_threshold)
            .finish()
    }
}
