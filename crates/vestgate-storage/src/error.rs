//! Storage error types.
//!
//! Every variant names the key or path involved so failures can be traced
//! from a log line alone.

/// Errors that can occur during session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to read a value from storage.
    #[error("failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    /// Failed to write a value to storage.
    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },

    /// Failed to delete a key from storage.
    #[error("failed to delete key '{key}': {reason}")]
    Delete { key: String, reason: String },

    /// The backing file exists but does not hold a JSON object of strings.
    #[error("session file '{path}' is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
}
