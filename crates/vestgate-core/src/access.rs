//! Time-boxed document access flag.
//!
//! After a passcode verifies, the viewer calls [`AccessStore::grant`], which
//! writes two string entries to session storage:
//!
//! - `document_access_verified` = `"true"`
//! - `document_access_time` = grant time in epoch milliseconds
//!
//! The flag is honoured while `now - granted_at <= 60_000`. Expiry is
//! evaluated at read time only: there is no timer, and an expired flag stays
//! in storage until the next [`AccessStore::is_valid`] or
//! [`AccessStore::status`] call clears it.
//!
//! Two tabs (or processes) sharing a storage backend can race on the pair of
//! entries; nothing here coordinates them.

use std::time::Duration;

use tracing::{debug, info, warn};
use vestgate_storage::{SessionStorage, StorageError};

use crate::clock::{Clock, SystemClock};
use crate::error::AccessError;

/// Storage key holding the verified marker.
pub const VERIFIED_KEY: &str = "document_access_verified";

/// Storage key holding the grant timestamp (epoch ms, decimal string).
pub const TIME_KEY: &str = "document_access_time";

/// How long a grant stays valid.
pub const ACCESS_WINDOW: Duration = Duration::from_secs(60);

const VERIFIED_VALUE: &str = "true";

/// Result of reading the access flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    /// A live grant exists.
    Verified {
        /// When the grant was written, epoch ms.
        granted_at_ms: i64,
        /// Time left before the grant lapses.
        remaining: Duration,
    },
    /// No grant, or the grant has lapsed.
    Unverified,
}

impl AccessStatus {
    /// Whether this is a live grant.
    #[must_use]
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified { .. })
    }
}

enum Stored {
    Absent,
    Granted(i64),
    Malformed,
}

/// Session-scoped document access flag over an injected storage backend.
#[derive(Debug, Clone)]
pub struct AccessStore<S, C = SystemClock> {
    storage: S,
    clock: C,
    window_ms: i64,
}

impl<S: SessionStorage> AccessStore<S, SystemClock> {
    /// Create a store using wall-clock time.
    pub fn new(storage: S) -> Self {
        Self::with_clock(storage, SystemClock)
    }
}

impl<S: SessionStorage, C: Clock> AccessStore<S, C> {
    /// Create a store with an explicit clock.
    pub fn with_clock(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            window_ms: millis(ACCESS_WINDOW),
        }
    }

    /// Override the validity window.
    #[must_use]
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window_ms = millis(window);
        self
    }

    /// The underlying storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Record a successful verification at the current time.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Storage`] if either entry cannot be written.
    pub async fn grant(&self) -> Result<(), AccessError> {
        let now = self.clock.now_ms();
        self.storage.set(VERIFIED_KEY, VERIFIED_VALUE).await?;
        self.storage.set(TIME_KEY, &now.to_string()).await?;
        info!(granted_at_ms = now, "document access granted");
        Ok(())
    }

    /// Whether a live grant exists. Clears a lapsed grant as a side effect.
    ///
    /// Storage read failures are treated as no grant.
    pub async fn is_valid(&self) -> bool {
        self.status().await.is_verified()
    }

    /// Read the flag and report time remaining. Clears a lapsed or malformed
    /// grant as a side effect.
    pub async fn status(&self) -> AccessStatus {
        let stored = match self.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "failed to read document access flag");
                return AccessStatus::Unverified;
            }
        };

        match stored {
            Stored::Absent => AccessStatus::Unverified,
            Stored::Malformed => {
                debug!("discarding malformed document access flag");
                self.clear_quietly().await;
                AccessStatus::Unverified
            }
            Stored::Granted(granted_at_ms) => {
                let elapsed = self.clock.now_ms().saturating_sub(granted_at_ms);
                if elapsed <= self.window_ms {
                    let left = self.window_ms.saturating_sub(elapsed.max(0));
                    AccessStatus::Verified {
                        granted_at_ms,
                        remaining: Duration::from_millis(u64::try_from(left).unwrap_or(0)),
                    }
                } else {
                    debug!(elapsed_ms = elapsed, "document access expired");
                    self.clear_quietly().await;
                    AccessStatus::Unverified
                }
            }
        }
    }

    /// Drop any grant, live or not.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::Storage`] if either entry cannot be removed.
    pub async fn revoke(&self) -> Result<(), AccessError> {
        self.clear().await?;
        info!("document access revoked");
        Ok(())
    }

    async fn load(&self) -> Result<Stored, StorageError> {
        let verified = self.storage.get(VERIFIED_KEY).await?;
        let time = self.storage.get(TIME_KEY).await?;

        Ok(match (verified, time) {
            (Some(verified), Some(time)) if verified == VERIFIED_VALUE => {
                time.trim().parse().map_or(Stored::Malformed, Stored::Granted)
            }
            (Some(_), Some(_)) => Stored::Malformed,
            _ => Stored::Absent,
        })
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(VERIFIED_KEY).await?;
        self.storage.remove(TIME_KEY).await
    }

    async fn clear_quietly(&self) {
        if let Err(e) = self.clear().await {
            warn!(error = %e, "failed to clear document access flag");
        }
    }
}

fn millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}
