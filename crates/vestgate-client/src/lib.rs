//! HTTP fetch wrappers for Vestgate.
//!
//! Two layers over `reqwest`:
//!
//! - [`Fetcher::fetch_with_timeout`] bounds a single request by a deadline and
//!   reports expiry as [`FetchError::Timeout`], distinct from other network
//!   failures.
//! - [`Fetcher::fetch_with_retry`] repeats the call on 5xx responses and on
//!   errors, sleeping `backoff_base * 2^attempt` between attempts, for at most
//!   `max_retries + 1` attempts in total.
//!
//! # Example
//!
//! ```rust,no_run
//! use vestgate_client::{FetchOptions, Fetcher};
//!
//! # async fn example() -> Result<(), vestgate_client::FetchError> {
//! let fetcher = Fetcher::new()?;
//! let resp = fetcher
//!     .fetch("https://api.example.com/properties", &FetchOptions::get())
//!     .await?;
//! if !resp.status().is_success() {
//!     // 5xx after the last retry and every 4xx land here.
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;

pub use error::FetchError;
pub use types::{CacheHint, FetchOptions};

use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Timeout and retry settings applied per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Deadline for each attempt. Default: 10 seconds.
    pub timeout: Duration,
    /// Retries after the first attempt. Default: 2.
    pub max_retries: u32,
    /// Delay before the first retry; doubles per retry. Default: 1 second.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after the failed attempt with index `attempt`
    /// (0-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Upper bound on time spent sleeping across `max_retries` retries.
    #[must_use]
    pub fn max_total_backoff(&self, max_retries: u32) -> Duration {
        (0..max_retries)
            .map(|attempt| self.backoff(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// HTTP client with deadline and retry wrappers.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    policy: RetryPolicy,
}
