//! Request options for the fetch wrappers.

use serde::Serialize;

/// Caching hint forwarded to the server and any intermediary caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheHint {
    /// No `Cache-Control` header.
    #[default]
    Default,
    /// `Cache-Control: no-store`.
    NoStore,
    /// `Cache-Control: no-cache`.
    NoCache,
    /// `Cache-Control: max-age=<secs>`, for data that may be reused for a while.
    Revalidate(u64),
}

impl CacheHint {
    pub(crate) fn header_value(self) -> Option<String> {
        match self {
            Self::Default => None,
            Self::NoStore => Some("no-store".to_owned()),
            Self::NoCache => Some("no-cache".to_owned()),
            Self::Revalidate(secs) => Some(format!("max-age={secs}")),
        }
    }
}

/// Method, headers, body and caching hint for one request.
///
/// Cloneable so every retry can rebuild the request from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// HTTP method. Default: `GET`.
    pub method: String,
    /// Request headers, sent in order.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Option<String>,
    /// Caching hint.
    pub cache: CacheHint,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl FetchOptions {
    /// A bare `GET`.
    #[must_use]
    pub fn get() -> Self {
        Self::method("GET")
    }

    /// A `POST` with the given body.
    #[must_use]
    pub fn post(body: impl Into<String>) -> Self {
        Self::method("POST").body(body)
    }

    /// An empty request with the given method.
    #[must_use]
    pub fn method(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            headers: Vec::new(),
            body: None,
            cache: CacheHint::Default,
        }
    }

    /// Append a header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the body and mark it `application/json`.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `value` cannot be encoded.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(value)?;
        Ok(self.header("content-type", "application/json").body(body))
    }

    /// Set the caching hint.
    #[must_use]
    pub fn cache(mut self, cache: CacheHint) -> Self {
        self.cache = cache;
        self
    }
}
