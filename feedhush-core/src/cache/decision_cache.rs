// File: src/cache/decision_cache.rs

use std::num::NonZeroUsize;

use futures_util::future::{BoxFuture, Shared};
use lru::LruCache;
use parking_lot::Mutex;

/// Number of distinct post texts remembered by default.
pub const DEFAULT_CACHE_CAPACITY: usize = 500;

/// Cloneable handle to a hide decision that may still be in flight.
///
/// Every clone observes the same single computation.
pub type PendingDecision = Shared<BoxFuture<'static, bool>>;

/// Bounded map from exact post text to its (possibly pending) decision.
///
/// Least-recently-used entries are evicted once `capacity` is reached. Reads
/// through [`get`](Self::get) and writes through [`set`](Self::set) both count
/// as use; [`has`](Self::has) does not.
pub struct DecisionCache {
    entries: Mutex<LruCache<String, PendingDecision>>,
}

impl DecisionCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.lock().contains(key)
    }

    pub fn get(&self, key: &str) -> Option<PendingDecision> {
        self.entries.lock().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: PendingDecision) {
        self.entries.lock().put(key.into(), value);
    }

    /// Return the entry for `key`, inserting the result of `make` if absent.
    ///
    /// The lookup and the insert happen under one lock, so concurrent callers
    /// for the same key always share one handle. `make` must not block.
    pub fn get_or_insert_with<F>(&self, key: &str, make: F) -> (PendingDecision, bool)
    where
        F: FnOnce() -> PendingDecision,
    {
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get(key) {
            return (existing.clone(), true);
        }
        let pending = make();
        entries.put(key.to_string(), pending.clone());
        (pending, false)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }
}

impl Default for DecisionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
