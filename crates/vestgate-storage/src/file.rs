//! JSON-file session storage.
//!
//! The whole store is one JSON object of string values. Every write reads
//! the file, applies the change and replaces the file through a sibling
//! temporary file plus `rename`, so a crash never leaves a half-written
//! object behind. A missing file is an empty store.
//!
//! Writers in other processes are not coordinated; the last rename wins.
//! A corrupt file fails reads and writes, but `remove` replaces it with an
//! empty object so the flag can always be cleared.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use crate::{SessionStorage, StorageError};

type Entries = BTreeMap<String, String>;

/// A session storage backend persisted to a single JSON file.
///
/// # Examples
///
/// ```no_run
/// # use vestgate_storage::FileBackend;
/// let storage = FileBackend::new(".vestgate-session.json");
/// ```
#[derive(Clone)]
pub struct FileBackend {
    path: PathBuf,
    // Serializes read-modify-write cycles from this process.
    lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for FileBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FileBackend {
    /// Create a backend for the given path. The file is not touched until the
    /// first operation.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Return the filesystem path of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self, key: &str) -> Result<Entries, StorageError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => {
                return Err(StorageError::Read {
                    key: key.to_owned(),
                    reason: format!("{}: {e}", self.path.display()),
                });
            }
        };
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Entries::new());
        }
        serde_json::from_slice(&raw).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "session file is corrupt");
            StorageError::Corrupt {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }
        })
    }

    async fn store(&self, key: &str, entries: &Entries) -> Result<(), StorageError> {
        let write_err = |reason: String| StorageError::Write {
            key: key.to_owned(),
            reason,
        };

        let body = serde_json::to_vec_pretty(entries).map_err(|e| write_err(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &body)
            .await
            .map_err(|e| write_err(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| write_err(format!("{}: {e}", self.path.display())))
    }
}

#[async_trait::async_trait]
impl SessionStorage for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load(key).await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load(key).await.map_err(|e| StorageError::Write {
            key: key.to_owned(),
            reason: e.to_string(),
        })?;
        entries.insert(key.to_owned(), value.to_owned());
        self.store(key, &entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let (mut entries, reset) = match self.load(key).await {
            Ok(entries) => (entries, false),
            Err(StorageError::Corrupt { .. }) => {
                warn!(path = %self.path.display(), key, "resetting corrupt session file");
                (Entries::new(), true)
            }
            Err(e) => {
                return Err(StorageError::Delete {
                    key: key.to_owned(),
                    reason: e.to_string(),
                });
            }
        };
        if entries.remove(key).is_none() && !reset {
            return Ok(());
        }
        self.store(key, &entries).await.map_err(|e| StorageError::Delete {
            key: key.to_owned(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn backend_in(dir: &tempfile::TempDir) -> FileBackend {
        FileBackend::new(dir.path().join("session.json"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = backend_in(&dir);
        assert_eq!(storage.get("anything").await.unwrap(), None);
        assert!(!storage.path().exists());
    }

    #[tokio::test]
    async fn set_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        backend_in(&dir).set("key", "val").await.unwrap();

        let reopened = backend_in(&dir);
        assert_eq!(reopened.get("key").await.unwrap().as_deref(), Some("val"));
    }

    #[tokio::test]
    async fn remove_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = backend_in(&dir);
        storage.set("a", "1").await.unwrap();
        storage.set("b", "2").await.unwrap();
        storage.remove("a").await.unwrap();

        assert_eq!(storage.get("a").await.unwrap(), None);
        assert_eq!(storage.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn remove_missing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let storage = backend_in(&dir);
        storage.remove("nope").await.unwrap();
        assert!(!storage.path().exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let storage = backend_in(&dir);
        std::fs::write(storage.path(), b"[1, 2, 3]").unwrap();

        let err = storage.get("key").await.unwrap_err();
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn remove_resets_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = backend_in(&dir);
        std::fs::write(storage.path(), b"{not json").unwrap();

        storage.remove("key").await.unwrap();

        assert_eq!(std::fs::read_to_string(storage.path()).unwrap().trim(), "{}");
        assert_eq!(storage.get("key").await.unwrap(), None);
        storage.set("key", "val").await.unwrap();
        assert_eq!(storage.get("key").await.unwrap().as_deref(), Some("val"));
    }

    #[tokio::test]
    async fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let storage = backend_in(&dir);
        storage.set("key", "val").await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["session.json".to_owned()]);
    }
}
