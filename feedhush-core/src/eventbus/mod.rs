//! src/eventbus/mod.rs
//!
//! In-process bus carrying page change notifications to the mutation watcher
//! (and anything else that subscribes) via bounded MPSC queues.

pub mod watcher;

use std::sync::Arc;

use tokio::sync::{mpsc, watch, Mutex};

use feedhush_common::models::MutationRecord;

pub use watcher::{MutationWatcher, RescanPolicy};

/// Events published by whatever bridges the live page into this process.
#[derive(Debug, Clone)]
pub enum PageEvent {
    /// One batch of mutation records, as delivered by a single observer
    /// callback.
    Mutations(Vec<MutationRecord>),

    /// Explicit request to scan again without a page change.
    Rescan,
}

impl PageEvent {
    /// Whether this event should trigger a scan pass.
    pub fn should_rescan(&self) -> bool {
        match self {
            PageEvent::Mutations(records) => records.iter().any(MutationRecord::adds_nodes),
            PageEvent::Rescan => true,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            PageEvent::Mutations(_) => "mutations",
            PageEvent::Rescan => "rescan",
        }
    }
}

/// Each subscriber gets its own `mpsc::Sender<PageEvent>` for guaranteed delivery.
///
/// - If the subscriber's channel buffer fills, `publish` will await
///   until there's space (backpressure).
/// - If the subscriber has dropped the `Receiver`, the channel is closed
///   and sending returns an error, which is ignored.
#[derive(Clone)]
pub struct PageEventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<PageEvent>>>>,
    shutdown_tx: watch::Sender<bool>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Default size for each subscriber's buffer.
const DEFAULT_BUFFER_SIZE: usize = 1024;

impl PageEventBus {
    /// Create a new, empty event bus.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Returns a receiver on which events will be delivered.
    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<PageEvent> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(tx);
        rx
    }

    /// Publish an event to all subscribers.
    pub async fn publish(&self, event: PageEvent) {
        let senders = {
            let subs = self.subscribers.lock().await;
            subs.clone()
        };
        for s in senders {
            let _ = s.send(event.clone()).await;
        }
    }

    /// Convenience method: publish one mutation batch.
    pub async fn publish_mutations(&self, records: Vec<MutationRecord>) {
        self.publish(PageEvent::Mutations(records)).await;
    }
}

impl Default for PageEventBus {
    fn default() -> Self {
        Self::new()
    }
}
