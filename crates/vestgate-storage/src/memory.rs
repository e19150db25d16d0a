//! In-memory session storage.
//!
//! Data lives in a `BTreeMap` behind a `RwLock` and is lost when the last
//! clone is dropped, the same lifetime a browser tab gives `sessionStorage`.

use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{SessionStorage, StorageError};

/// An in-memory session storage backend.
///
/// Clones share state, so a test can hand one clone to the access store and
/// inspect the other.
///
/// # Examples
///
/// ```
/// # use vestgate_storage::{MemoryBackend, SessionStorage};
/// # #[tokio::main]
/// # async fn main() {
/// let storage = MemoryBackend::new();
/// storage.set("document_access_verified", "true").await.unwrap();
/// let val = storage.get("document_access_verified").await.unwrap();
/// assert_eq!(val.as_deref(), Some("true"));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    /// Whether the backend holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SessionStorage for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.remove(key);
        Ok(())
    }
}
