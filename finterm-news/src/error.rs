//! Error types for feed retrieval

use thiserror::Error;

/// Errors that can occur while fetching a single feed source
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Request exceeded its timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Source returned a non-success status
    #[error("HTTP error! status: {status}")]
    ApiError {
        /// HTTP status code
        status: u16,
    },

    /// Body could not be parsed as RSS or Atom
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FeedError::Timeout(e.to_string())
        } else {
            FeedError::RequestFailed(e.to_string())
        }
    }
}
