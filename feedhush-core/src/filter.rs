// File: src/filter.rs
//
// Startup sequence: load settings, hide what is already on the page, then
// keep watching for new posts.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info};

use feedhush_common::error::Error;
use feedhush_common::traits::{FeedPage, OptionStore};

use crate::config::FilterConfig;
use crate::decision::DecisionEngine;
use crate::eventbus::{MutationWatcher, PageEventBus, RescanPolicy};
use crate::scanner::{ScanReport, Scanner};
use crate::settings::load_openai_filter_config;

pub struct FeedFilter {
    page: Arc<dyn FeedPage>,
    engine: Arc<DecisionEngine>,
    scanner: Arc<Scanner>,
    policy: RescanPolicy,
    reports: Option<mpsc::UnboundedSender<ScanReport>>,
}

/// A filter whose initial pass has finished and whose watcher is running.
pub struct RunningFilter {
    pub config: Arc<FilterConfig>,
    pub initial: ScanReport,
    pub watcher: JoinHandle<()>,
}

impl FeedFilter {
    pub fn new(page: Arc<dyn FeedPage>, engine: Arc<DecisionEngine>, scanner: Scanner) -> Self {
        Self {
            page,
            engine,
            scanner: Arc::new(scanner),
            policy: RescanPolicy::default(),
            reports: None,
        }
    }

    pub fn with_rescan_policy(mut self, policy: RescanPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Forward reports of watcher-triggered scans to `sink`.
    pub fn with_report_sink(mut self, sink: mpsc::UnboundedSender<ScanReport>) -> Self {
        self.reports = Some(sink);
        self
    }

    /// Load settings from `store` with an OpenAI-compatible client and start.
    ///
    /// A settings failure is fatal: it is logged and returned, and no watcher
    /// is started.
    pub async fn start(&self, store: &dyn OptionStore, bus: &PageEventBus) -> Result<RunningFilter, Error> {
        let config = match load_openai_filter_config(store).await {
            Ok(config) => Arc::new(config),
            Err(e) => {
                error!("Error initializing client: {}", e);
                return Err(e);
            }
        };
        Ok(self.start_with_config(config, bus).await)
    }

    /// Start with an already loaded configuration.
    pub async fn start_with_config(&self, config: Arc<FilterConfig>, bus: &PageEventBus) -> RunningFilter {
        // Subscribe first so mutations during the initial pass are queued.
        let events = bus.subscribe(None).await;

        let initial = self.scan(&config).await;
        info!(
            "Done hiding existing posts ({} examined, {} hidden)",
            initial.examined,
            initial.hidden.len()
        );

        let mut watcher = MutationWatcher::new(
            Arc::clone(&self.page),
            Arc::clone(&self.engine),
            Arc::clone(&self.scanner),
            Arc::clone(&config),
        )
        .with_policy(self.policy);
        if let Some(sink) = &self.reports {
            watcher = watcher.with_report_sink(sink.clone());
        }

        RunningFilter {
            config,
            initial,
            watcher: watcher.spawn(events, bus.shutdown_rx.clone()),
        }
    }

    /// A single pass over the page with `config`.
    pub async fn scan(&self, config: &Arc<FilterConfig>) -> ScanReport {
        self.scanner.scan(self.page.as_ref(), &self.engine, config).await
    }
}
