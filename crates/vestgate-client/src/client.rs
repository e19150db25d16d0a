//! `Fetcher` implementation.

use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::types::FetchOptions;
use crate::{Fetcher, RetryPolicy};

impl Fetcher {
    /// Create a fetcher with the default policy (10s timeout, 2 retries).
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` if the HTTP client cannot be built.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_policy(RetryPolicy::default())
    }

    /// Create a fetcher with a custom policy.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Network` if the HTTP client cannot be built.
    pub fn with_policy(policy: RetryPolicy) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vestgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Network)?;
        Ok(Self::with_client(client, policy))
    }

    /// Wrap an existing `reqwest` client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// The policy used by [`fetch`](Self::fetch) and for per-attempt deadlines.
    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch with the fetcher's own timeout and retry budget.
    ///
    /// # Errors
    ///
    /// See [`fetch_with_retry`](Self::fetch_with_retry).
    pub async fn fetch(&self, url: &str, opts: &FetchOptions) -> Result<Response, FetchError> {
        self.fetch_with_retry(url, opts, self.policy.max_retries).await
    }

    /// Send one request, giving up after `timeout`.
    ///
    /// The in-flight request is dropped (and its connection abandoned) when
    /// the deadline fires. Any status code counts as completion.
    ///
    /// # Errors
    ///
    /// - `FetchError::Timeout` if the deadline expires first.
    /// - `FetchError::InvalidRequest` if `opts` has a bad method or header.
    /// - `FetchError::Network` for any other transport failure.
    pub async fn fetch_with_timeout(
        &self,
        url: &str,
        opts: &FetchOptions,
        timeout: Duration,
    ) -> Result<Response, FetchError> {
        let request = self.build(url, opts)?;

        match tokio::time::timeout(timeout, request.send()).await {
            Ok(result) => Ok(result?),
            Err(_elapsed) => Err(FetchError::Timeout {
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }

    /// Send a request, retrying transient failures.
    ///
    /// Makes at most `max_retries + 1` attempts, each bounded by the policy
    /// timeout. A 5xx response or an error on a non-final attempt sleeps
    /// `backoff_base * 2^attempt` and tries again. Any other status is
    /// returned at once. On the final attempt a 5xx response is returned
    /// as-is, so callers must check the status.
    ///
    /// # Errors
    ///
    /// The error from the final attempt, or `FetchError::InvalidRequest`
    /// immediately if `opts` cannot form a request.
    pub async fn fetch_with_retry(
        &self,
        url: &str,
        opts: &FetchOptions,
        max_retries: u32,
    ) -> Result<Response, FetchError> {
        let mut attempt = 0;

        loop {
            let last = attempt >= max_retries;

            match self.fetch_with_timeout(url, opts, self.policy.timeout).await {
                Ok(resp) if resp.status().is_server_error() && !last => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        url,
                        attempt,
                        status = resp.status().as_u16(),
                        delay_ms = delay_ms(delay),
                        "server error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(resp) => {
                    debug!(url, attempt, status = resp.status().as_u16(), "fetch complete");
                    return Ok(resp);
                }
                Err(e @ FetchError::InvalidRequest { .. }) => return Err(e),
                Err(e) if !last => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        url,
                        attempt,
                        error = %e,
                        delay_ms = delay_ms(delay),
                        "fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }

            attempt += 1;
        }
    }

    // --- Private ---

    fn build(&self, url: &str, opts: &FetchOptions) -> Result<RequestBuilder, FetchError> {
        let method = Method::from_bytes(opts.method.to_uppercase().as_bytes()).map_err(|_| {
            FetchError::InvalidRequest {
                reason: format!("bad method '{}'", opts.method),
            }
        })?;

        let mut req = self.client.request(method, url);

        for (name, value) in &opts.headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| FetchError::InvalidRequest {
                    reason: format!("bad header name '{name}'"),
                })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| FetchError::InvalidRequest {
                    reason: format!("bad value for header '{name}'"),
                })?;
            req = req.header(header_name, header_value);
        }

        if let Some(cache) = opts.cache.header_value() {
            req = req.header(CACHE_CONTROL, cache);
        }

        if let Some(ref body) = opts.body {
            req = req.body(body.clone());
        }

        Ok(req)
    }
}

fn delay_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
