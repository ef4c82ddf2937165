// ================================================================
// File: feedhush-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found error: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Selector error: {0}")]
    Selector(String),

    #[error("Page error: {0}")]
    Page(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
