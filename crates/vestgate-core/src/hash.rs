//! Hashing utility.
//!
//! Text is hashed as its UTF-8 bytes with SHA-256 and rendered as 64
//! lowercase hex characters. The [`Digester`] trait is the seam around the
//! primitive so the verifier can be driven with a failing or counting
//! digester in tests.

use sha2::{Digest, Sha256};

use crate::error::HashError;

/// Length of a hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// A text digest primitive.
pub trait Digester: Send + Sync {
    /// Hash `text` to a lowercase hex string.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Unavailable`] if the primitive cannot run.
    fn digest(&self, text: &str) -> Result<String, HashError>;
}

/// SHA-256 digester. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digester;

impl Digester for Sha256Digester {
    fn digest(&self, text: &str) -> Result<String, HashError> {
        Ok(hash(text))
    }
}

/// SHA-256 of `text`, hex-encoded in lowercase.
#[must_use]
pub fn hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Whether `s` has the shape of a digest produced by [`hash`].
#[must_use]
pub fn is_digest(s: &str) -> bool {
    s.len() == DIGEST_HEX_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
