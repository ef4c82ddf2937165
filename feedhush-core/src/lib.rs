// src/lib.rs

pub mod cache;
pub mod config;
pub mod decision;
pub mod eventbus;
pub mod filter;
pub mod page;
pub mod scanner;
pub mod settings;
pub mod store;

pub use cache::{DecisionCache, PendingDecision};
pub use config::FilterConfig;
pub use decision::{DecisionEngine, DecisionStrategy};
pub use eventbus::{PageEvent, PageEventBus};
pub use feedhush_common::error::Error;
pub use filter::{FeedFilter, RunningFilter};
pub use page::MemoryPage;
pub use scanner::{ScanReport, Scanner};
