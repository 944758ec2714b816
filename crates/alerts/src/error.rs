//! Error types for SMS dispatch.

use thiserror::Error;

/// Errors that can occur while handing a message to an SMS provider.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{channel} rejected message (HTTP {status}): {body}")]
    Rejected {
        channel: &'static str,
        status: u16,
        body: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        DispatchError::Parse(err.to_string())
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
