//! Session storage abstraction for Vestgate.
//!
//! This crate defines the [`SessionStorage`] trait, a string key-value
//! interface standing in for browser session storage. The access store in
//! `vestgate-core` is generic over it, so the passcode gate can be exercised
//! without a browser context.
//!
//! Two implementations are provided:
//!
//! - [`MemoryBackend`]: in-memory, scoped to the lifetime of the value
//! - [`FileBackend`]: a single JSON object on disk, used by the CLI

mod error;
mod file;
mod memory;

pub use error::StorageError;
pub use file::FileBackend;
pub use memory::MemoryBackend;

/// A pluggable session-scoped key-value store.
///
/// Keys and values are plain strings, mirroring the browser `sessionStorage`
/// API. Absence of a key is reported as `Ok(None)`, never as an error.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait SessionStorage: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store a value, overwriting any existing one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Delete`] if the underlying backend fails.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}
