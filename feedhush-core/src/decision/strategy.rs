// File: src/decision/strategy.rs

use std::fmt;
use std::str::FromStr;

use feedhush_ai::{extract_probabilities, ChatCompletion};
use feedhush_common::error::Error;
use tracing::debug;

/// How a completion is turned into a hide decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecisionStrategy {
    /// Hide when the answer text contains "no" anywhere, ignoring case.
    #[default]
    ContainsNo,
    /// Hide when the no-probability of the first answer token reaches the
    /// configured hide threshold.
    LogprobThreshold,
}

/// Number of alternatives requested per token for the log-probability rule.
pub const TOP_LOGPROBS: u8 = 5;

impl DecisionStrategy {
    pub fn needs_logprobs(self) -> bool {
        matches!(self, DecisionStrategy::LogprobThreshold)
    }

    pub fn interpret(self, completion: &ChatCompletion, hide_threshold: f64) -> Result<bool, Error> {
        match self {
            DecisionStrategy::ContainsNo => {
                let content = completion
                    .first_content()
                    .ok_or_else(|| Error::Api("completion has no message content".to_string()))?;
                Ok(completion_says_hide(content))
            }
            DecisionStrategy::LogprobThreshold => {
                let logprobs = completion
                    .first_token_logprobs()
                    .ok_or_else(|| Error::Api("completion has no token log-probabilities".to_string()))?;
                let probabilities = extract_probabilities(&logprobs)
                    .map_err(|e| Error::Api(e.to_string()))?;
                debug!(
                    "yes={:.4} no={:.4} threshold={}",
                    probabilities.yes_probability, probabilities.no_probability, hide_threshold
                );
                Ok(probabilities.no_probability >= hide_threshold)
            }
        }
    }
}

impl fmt::Display for DecisionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionStrategy::ContainsNo => f.write_str("contains-no"),
            DecisionStrategy::LogprobThreshold => f.write_str("logprob-threshold"),
        }
    }
}

impl FromStr for DecisionStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "contains-no" | "contains_no" => Ok(DecisionStrategy::ContainsNo),
            "logprob-threshold" | "logprob_threshold" | "threshold" => Ok(DecisionStrategy::LogprobThreshold),
            other => Err(Error::Parse(format!("unknown decision strategy '{other}'"))),
        }
    }
}

/// Substring rule applied to a completion's answer text.
pub fn completion_says_hide(content: &str) -> bool {
    content.trim().to_lowercase().contains("no")
}
