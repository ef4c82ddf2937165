use thiserror::Error;

use crate::models::TokenLogprobs;

/// Normalized likelihood of a yes or a no answer; the two fields sum to 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YesNoProbabilities {
    pub yes_probability: f64,
    pub no_probability: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum ProbabilityError {
    /// Neither bucket carried any probability mass, so no ratio exists.
    #[error("no yes/no probability mass among {candidates} candidate tokens")]
    Degenerate { candidates: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Yes,
    No,
}

fn classify(token: &str) -> Option<Answer> {
    let token = token.trim();
    if token.eq_ignore_ascii_case("yes") || token.eq_ignore_ascii_case("y") {
        Some(Answer::Yes)
    } else if token.eq_ignore_ascii_case("no") || token.eq_ignore_ascii_case("n") {
        Some(Answer::No)
    } else {
        None
    }
}

/// Collapse the candidate tokens of one position into yes/no probabilities.
///
/// Tokens spelling `YES`/`Y` or `NO`/`N` (any case, surrounding whitespace
/// ignored) are summed in linear space; every other token is ignored.
pub fn extract_probabilities(logprobs: &TokenLogprobs) -> Result<YesNoProbabilities, ProbabilityError> {
    let mut yes = 0.0_f64;
    let mut no = 0.0_f64;

    for (token, logprob) in logprobs {
        match classify(token) {
            Some(Answer::Yes) => yes += logprob.exp(),
            Some(Answer::No) => no += logprob.exp(),
            None => {}
        }
    }

    let total = yes + no;
    if !(total.is_finite() && total > 0.0) {
        return Err(ProbabilityError::Degenerate {
            candidates: logprobs.len(),
        });
    }

    Ok(YesNoProbabilities {
        yes_probability: yes / total,
        no_probability: no / total,
    })
}
