// File: src/scanner.rs

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, trace};

use feedhush_common::error::Error;
use feedhush_common::models::{NodeId, Selector};
use feedhush_common::traits::FeedPage;

use crate::config::FilterConfig;
use crate::decision::DecisionEngine;

/// Selector for the text block of a feed post.
pub const DEFAULT_POST_SELECTOR: &str = r#"div[data-testid="tweetText"]"#;

/// Tag of the element that wraps a whole post.
pub const DEFAULT_CONTAINER_TAG: &str = "article";

/// Outcome of one scan pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Post text elements looked at.
    pub examined: usize,
    /// Containers hidden during this pass.
    pub hidden: Vec<NodeId>,
    /// Posts that should be hidden but had no container (or went stale).
    pub skipped: usize,
}

/// Finds post elements on a page and hides the ones the engine rejects.
#[derive(Debug, Clone)]
pub struct Scanner {
    selector: Selector,
    container_tag: String,
}

impl Scanner {
    pub fn new(selector: Selector) -> Self {
        Self {
            selector,
            container_tag: DEFAULT_CONTAINER_TAG.to_string(),
        }
    }

    pub fn with_container_tag(mut self, tag: impl Into<String>) -> Self {
        self.container_tag = tag.into();
        self
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// One pass over the page.
    ///
    /// Posts are handled one at a time in document order, each decision
    /// awaited before the next post is looked at.
    pub async fn scan(
        &self,
        page: &dyn FeedPage,
        engine: &DecisionEngine,
        config: &Arc<FilterConfig>,
    ) -> ScanReport {
        let mut report = ScanReport::default();

        for post in page.query_selector_all(&self.selector) {
            // The element may have been detached since the query.
            let Some(text) = page.text_content(post) else {
                continue;
            };
            report.examined += 1;

            if !engine.decide(config, &text).await {
                continue;
            }

            match self.hide(page, post) {
                Ok(Some(container)) => report.hidden.push(container),
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    debug!("Could not hide post {}: {}", post, e);
                    report.skipped += 1;
                }
            }
        }

        trace!(
            "Scan examined {} posts, hid {}, skipped {}",
            report.examined,
            report.hidden.len(),
            report.skipped
        );
        report
    }

    fn hide(&self, page: &dyn FeedPage, post: NodeId) -> Result<Option<NodeId>, Error> {
        let Some(container) = page.closest(post, &self.container_tag) else {
            return Ok(None);
        };
        page.set_style(container, "display", "none")?;
        Ok(Some(container))
    }
}

impl Default for Scanner {
    fn default() -> Self {
        // The default selector is a literal that always parses.
        let selector = Selector::parse(DEFAULT_POST_SELECTOR)
            .unwrap_or_else(|e| unreachable!("default post selector: {e}"));
        Self::new(selector)
    }
}
