pub mod engine;
pub mod strategy;

pub use engine::DecisionEngine;
pub use strategy::{completion_says_hide, DecisionStrategy};
