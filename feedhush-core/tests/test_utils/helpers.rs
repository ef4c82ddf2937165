// File: feedhush-core/tests/test_utils/helpers.rs

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use feedhush_ai::{ChatCompletion, ChatCompletionRequest, CompletionApi};
use feedhush_common::models::PageNode;
use feedhush_core::FilterConfig;

type Responder = dyn Fn(&str) -> anyhow::Result<ChatCompletion> + Send + Sync;

/// Completion endpoint that answers from a closure over the prompt and
/// records every request it sees.
pub struct FakeCompletion {
    responder: Box<Responder>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ChatCompletionRequest>>,
    gate: Option<Arc<Semaphore>>,
}

impl FakeCompletion {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<ChatCompletion> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Always answer with `text`.
    pub fn answering(text: &'static str) -> Self {
        Self::new(move |_| Ok(ChatCompletion::from_text(text)))
    }

    /// Answer "No" when the prompt mentions `needle`, "Yes" otherwise.
    pub fn hiding_posts_with(needle: &'static str) -> Self {
        Self::new(move |prompt| {
            if prompt.contains(needle) {
                Ok(ChatCompletion::from_text("No"))
            } else {
                Ok(ChatCompletion::from_text("Yes"))
            }
        })
    }

    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_| Err(anyhow::anyhow!(message)))
    }

    /// Hold every call until permits are added to the returned semaphore.
    pub fn gated(mut self) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|r| r.messages[0].content.clone())
            .collect()
    }
}

#[async_trait]
impl CompletionApi for FakeCompletion {
    fn name(&self) -> &str {
        "fake"
    }

    async fn chat_completion(&self, request: &ChatCompletionRequest) -> anyhow::Result<ChatCompletion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await?;
            permit.forget();
        }

        (self.responder)(&request.messages[0].content)
    }
}

pub fn config_with(client: Arc<FakeCompletion>) -> Arc<FilterConfig> {
    Arc::new(FilterConfig {
        client,
        model: "test-model".to_string(),
        prompt_template: "{prompt_instructions}: {tweet}".to_string(),
        prompt_instructions: "Hide spam".to_string(),
        hide_threshold: 0.5,
    })
}

/// An `article` wrapping a post text block, the way feeds nest them.
pub fn post(id: &str, text: &str) -> PageNode {
    PageNode::new("article").with_attribute("id", id).with_child(
        PageNode::new("div").with_child(
            PageNode::new("div")
                .with_attribute("data-testid", "tweetText")
                .with_child(PageNode::new("span").with_text(text)),
        ),
    )
}

/// A post text block with no enclosing `article`.
pub fn bare_post(text: &str) -> PageNode {
    PageNode::new("div")
        .with_attribute("data-testid", "tweetText")
        .with_text(text)
}

pub fn feed(posts: Vec<PageNode>) -> PageNode {
    let mut main = PageNode::new("main");
    main.children = posts;
    PageNode::new("body").with_child(main)
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
