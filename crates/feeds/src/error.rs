//! Error types for fetch operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching account or market data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("OKX API error {code}: {msg}")]
    Api { code: String, msg: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Response contained no data")]
    EmptyData,

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

impl FetchError {
    /// Returns true if the exchange rejected our credentials or signature.
    /// A stale timestamp shows up here as well.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status == 401 || *status == 403,
            // 50102: timestamp expired, 50111-50113: invalid key/sign/passphrase
            FetchError::Api { code, .. } => {
                matches!(code.as_str(), "50102" | "50111" | "50112" | "50113")
            }
            _ => false,
        }
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
