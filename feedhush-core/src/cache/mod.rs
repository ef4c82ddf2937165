pub mod decision_cache;

pub use decision_cache::{DecisionCache, PendingDecision, DEFAULT_CACHE_CAPACITY};
