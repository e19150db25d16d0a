//! Error types for `vestgate-core`.
//!
//! Passcode errors never carry the candidate text, only the reason it was
//! turned away.

use vestgate_storage::StorageError;

/// Errors from the hashing utility.
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// The digest primitive could not produce output.
    #[error("digest primitive unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Why a passcode candidate was rejected.
///
/// The public verifier collapses all of these to `false`; this type exists
/// so callers and tests can see which path was taken.
#[derive(Debug, thiserror::Error)]
pub enum Rejection {
    /// The candidate was empty or whitespace only. Nothing was hashed.
    #[error("passcode is empty")]
    Empty,

    /// The candidate hashed cleanly but matched no allow-list entry.
    #[error("passcode does not match any allow-list entry")]
    NoMatch,

    /// The candidate could not be hashed.
    #[error("passcode could not be hashed: {0}")]
    Hash(#[from] HashError),
}

/// Errors from the allow-list loader.
#[derive(Debug, thiserror::Error)]
pub enum AllowListError {
    /// The source was not a JSON array of strings.
    #[error("allow-list is not a JSON array of strings: {reason}")]
    Parse { reason: String },
}

/// Errors from the session access store.
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// The session storage backend failed.
    #[error("access store storage error: {0}")]
    Storage(#[from] StorageError),
}
