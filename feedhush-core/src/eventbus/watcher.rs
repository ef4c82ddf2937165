// File: src/eventbus/watcher.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, trace};

use feedhush_common::traits::FeedPage;

use crate::config::FilterConfig;
use crate::decision::DecisionEngine;
use crate::eventbus::PageEvent;
use crate::scanner::{ScanReport, Scanner};

/// When to scan after a qualifying mutation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RescanPolicy {
    /// Start a separate scan for every qualifying batch. Passes may overlap;
    /// the decision cache keeps them from issuing duplicate remote calls.
    #[default]
    Immediate,
    /// After a qualifying batch, wait until the bus has been quiet for the
    /// given window, then scan once for the whole burst.
    Debounce(Duration),
}

/// Re-runs the scanner whenever the page gains nodes.
pub struct MutationWatcher {
    page: Arc<dyn FeedPage>,
    engine: Arc<DecisionEngine>,
    scanner: Arc<Scanner>,
    config: Arc<FilterConfig>,
    policy: RescanPolicy,
    reports: Option<mpsc::UnboundedSender<ScanReport>>,
}

impl MutationWatcher {
    pub fn new(
        page: Arc<dyn FeedPage>,
        engine: Arc<DecisionEngine>,
        scanner: Arc<Scanner>,
        config: Arc<FilterConfig>,
    ) -> Self {
        Self {
            page,
            engine,
            scanner,
            config,
            policy: RescanPolicy::default(),
            reports: None,
        }
    }

    pub fn with_policy(mut self, policy: RescanPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Send the report of every completed scan pass to `sink`.
    pub fn with_report_sink(mut self, sink: mpsc::UnboundedSender<ScanReport>) -> Self {
        self.reports = Some(sink);
        self
    }

    /// Consume `events` on a background task until shutdown is signalled or
    /// every publisher is gone.
    ///
    /// Batches still queued when shutdown arrives get one final scan, and the
    /// task only finishes after every scan it started has finished.
    pub fn spawn(
        self,
        events: mpsc::Receiver<PageEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(Arc::new(self).run(events, shutdown))
    }

    async fn run(self: Arc<Self>, mut events: mpsc::Receiver<PageEvent>, mut shutdown: watch::Receiver<bool>) {
        info!("Watching page for new posts ({:?})", self.policy);
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    // An error means the bus is gone; nobody can signal us anymore.
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        break;
                    };
                    if !event.should_rescan() {
                        trace!("Ignoring {} event without added nodes", event.event_type());
                        continue;
                    }
                    match self.policy {
                        RescanPolicy::Immediate => {
                            let watcher = Arc::clone(&self);
                            in_flight.spawn(async move { watcher.scan_once().await });
                        }
                        RescanPolicy::Debounce(window) => {
                            let closed = drain_burst(&mut events, window).await;
                            self.scan_once().await;
                            if closed {
                                break;
                            }
                        }
                    }
                }
                Some(finished) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = finished {
                        error!("Rescan task failed: {}", e);
                    }
                }
            }
        }

        let mut queued = 0usize;
        while let Ok(event) = events.try_recv() {
            if event.should_rescan() {
                queued += 1;
            }
        }
        if queued > 0 {
            debug!("Scanning once for {} batches queued at shutdown", queued);
            self.scan_once().await;
        }

        while let Some(finished) = in_flight.join_next().await {
            if let Err(e) = finished {
                error!("Rescan task failed: {}", e);
            }
        }

        info!("Mutation watcher stopped");
    }

    async fn scan_once(&self) {
        let report = self
            .scanner
            .scan(self.page.as_ref(), &self.engine, &self.config)
            .await;
        info!(
            "Done hiding new posts ({} examined, {} hidden)",
            report.examined,
            report.hidden.len()
        );
        if let Some(sink) = &self.reports {
            let _ = sink.send(report);
        }
    }
}

/// Swallow events until `window` passes without any.
/// Returns true if the channel closed meanwhile.
async fn drain_burst(events: &mut mpsc::Receiver<PageEvent>, window: Duration) -> bool {
    let mut absorbed = 0usize;
    loop {
        match tokio::time::timeout(window, events.recv()).await {
            Err(_) => break,
            Ok(None) => return true,
            Ok(Some(event)) if event.should_rescan() => absorbed += 1,
            Ok(Some(_)) => {}
        }
    }
    if absorbed > 0 {
        debug!("Coalesced {} extra mutation batches into one scan", absorbed);
    }
    false
}
