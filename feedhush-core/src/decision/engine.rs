// File: src/decision/engine.rs

use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, error, info, trace};

use feedhush_ai::{build_prompt, ChatCompletionRequest, ChatMessage};

use crate::cache::{DecisionCache, PendingDecision};
use crate::config::FilterConfig;
use crate::decision::strategy::{DecisionStrategy, TOP_LOGPROBS};

/// Decides whether posts should be hidden, asking the remote model at most
/// once per distinct text while that text stays cached.
pub struct DecisionEngine {
    cache: Arc<DecisionCache>,
    strategy: DecisionStrategy,
}

impl DecisionEngine {
    pub fn new(cache: Arc<DecisionCache>, strategy: DecisionStrategy) -> Self {
        Self { cache, strategy }
    }

    pub fn cache(&self) -> &Arc<DecisionCache> {
        &self.cache
    }

    pub fn strategy(&self) -> DecisionStrategy {
        self.strategy
    }

    /// Resolve the hide decision for `text`.
    ///
    /// A concurrent caller with the same text attaches to the computation
    /// already in flight. Failures resolve to `false`; nothing is retried and
    /// no timeout is applied to the remote call.
    pub async fn decide(&self, config: &Arc<FilterConfig>, text: &str) -> bool {
        self.pending(config, text).await
    }

    /// The shared handle for `text`, created and cached on first sight.
    pub fn pending(&self, config: &Arc<FilterConfig>, text: &str) -> PendingDecision {
        let (pending, cached) = self.cache.get_or_insert_with(text, || {
            let config = Arc::clone(config);
            let strategy = self.strategy;
            let text = text.to_string();
            async move { evaluate(config, strategy, text).await }
                .boxed()
                .shared()
        });
        if cached {
            trace!("Decision cache hit for post ({} chars)", text.len());
        }
        pending
    }
}

async fn evaluate(config: Arc<FilterConfig>, strategy: DecisionStrategy, text: String) -> bool {
    match request_decision(&config, strategy, &text).await {
        Ok(hide) => {
            if hide {
                info!("Hiding post: {}", text);
            }
            hide
        }
        Err(e) => {
            error!("Error deciding post via {}: {:#}", config.client.name(), e);
            false
        }
    }
}

async fn request_decision(
    config: &FilterConfig,
    strategy: DecisionStrategy,
    text: &str,
) -> anyhow::Result<bool> {
    let prompt = build_prompt(&config.prompt_template, &config.prompt_instructions, text);
    debug!("Prompt for post: {}", prompt);

    let mut request = ChatCompletionRequest::new(config.model.clone(), vec![ChatMessage::user(prompt)]);
    if strategy.needs_logprobs() {
        request = request.with_logprobs(TOP_LOGPROBS);
    }

    let completion = config.client.chat_completion(&request).await?;
    let hide = strategy.interpret(&completion, config.hide_threshold)?;
    Ok(hide)
}
