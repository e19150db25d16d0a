//! Error types for the fetch wrappers.

/// All errors that can occur when fetching.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete before its deadline.
    #[error("request timed out after {timeout_ms}ms")]
    Timeout {
        /// The deadline that expired, in milliseconds.
        timeout_ms: u64,
    },

    /// The request could not be built from the given options.
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// What was wrong with the options.
        reason: String,
    },

    /// Network or HTTP client error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl FetchError {
    /// Whether this error is a deadline expiry.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
