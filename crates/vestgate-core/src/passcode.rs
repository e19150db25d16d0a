//! Passcode verification against a static allow-list.
//!
//! A passcode is normalized (trimmed, uppercased), hashed with SHA-256 and
//! compared against a fixed list of precomputed digests. Plaintext codes are
//! never stored; administrators run [`generate_hash`] offline and redeploy
//! the list.
//!
//! # Security model
//!
//! - Verification is fail-closed: empty input, a non-matching digest and a
//!   hashing failure all yield `false`.
//! - Entries are compared with `subtle::ConstantTimeEq` and every entry is
//!   visited, so timing does not reveal which slot matched.
//! - An entry that is not a digest (an unconfigured placeholder slot) can
//!   never equal a hash output and so never matches.

use subtle::{Choice, ConstantTimeEq};
use tracing::debug;

use crate::error::{AllowListError, HashError, Rejection};
use crate::hash::{self, Digester, Sha256Digester};

/// Built-in allow-list shipped with the site.
///
/// Trailing slots are placeholders waiting for codes to be issued.
pub const DEFAULT_PASSCODE_HASHES: &[&str] = &[
    // ACCESS2025
    "6a0fb0537b1a1e736a4d5fa5045d272b8a5c4c045d243ba31f0a59cf76f12c0f",
    // INVESTOR-DOCS
    "7c5858102e66e0c836ebe6ffb08e13d6dfcccf3fad1ef719fe1a9f81ff024e5b",
    "REPLACE_WITH_SHA256_OF_CODE_3",
    "REPLACE_WITH_SHA256_OF_CODE_4",
];

/// Ordered, immutable set of valid passcode digests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowList {
    entries: Vec<String>,
}

impl AllowList {
    /// Build a list from entries, kept verbatim and in order.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma-separated list, as carried in an environment variable.
    /// Blank items are skipped and surrounding whitespace is trimmed.
    #[must_use]
    pub fn from_csv(raw: &str) -> Self {
        Self::new(raw.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    /// Parse a JSON array of strings.
    ///
    /// # Errors
    ///
    /// Returns [`AllowListError::Parse`] if `raw` is not a JSON array of strings.
    pub fn from_json(raw: &str) -> Result<Self, AllowListError> {
        let entries: Vec<String> =
            serde_json::from_str(raw).map_err(|e| AllowListError::Parse {
                reason: e.to_string(),
            })?;
        Ok(Self { entries })
    }

    /// Entries in their configured order.
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries, placeholders included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries shaped like a real digest.
    #[must_use]
    pub fn configured(&self) -> usize {
        self.entries.iter().filter(|e| hash::is_digest(e)).count()
    }

    /// Exact, case-sensitive membership test in constant time per entry.
    #[must_use]
    pub fn contains(&self, digest: &str) -> bool {
        let found = self
            .entries
            .iter()
            .fold(Choice::from(0), |acc, entry| {
                acc | entry.as_bytes().ct_eq(digest.as_bytes())
            });
        bool::from(found)
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_PASSCODE_HASHES.iter().copied())
    }
}

/// Trim surrounding whitespace and uppercase, making codes case-insensitive.
#[must_use]
pub fn normalize(candidate: &str) -> String {
    candidate.trim().to_uppercase()
}

/// Digest an administrator-supplied code for inclusion in the allow-list.
///
/// Applies the same normalization as verification. Does not consult any
/// allow-list.
///
/// # Errors
///
/// Returns [`HashError`] if the digest primitive fails.
pub fn generate_hash(plain: &str) -> Result<String, HashError> {
    Sha256Digester.digest(&normalize(plain))
}

/// Checks passcode candidates against an [`AllowList`].
#[derive(Debug, Clone)]
pub struct PasscodeVerifier<D = Sha256Digester> {
    allow_list: AllowList,
    digester: D,
}

impl PasscodeVerifier<Sha256Digester> {
    /// Create a verifier using SHA-256.
    #[must_use]
    pub fn new(allow_list: AllowList) -> Self {
        Self::with_digester(allow_list, Sha256Digester)
    }
}

impl Default for PasscodeVerifier<Sha256Digester> {
    fn default() -> Self {
        Self::new(AllowList::default())
    }
}

impl<D: Digester> PasscodeVerifier<D> {
    /// Create a verifier with a custom digest primitive.
    pub fn with_digester(allow_list: AllowList, digester: D) -> Self {
        Self {
            allow_list,
            digester,
        }
    }

    /// The allow-list this verifier checks against.
    #[must_use]
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Check a candidate and report why it was rejected.
    ///
    /// # Errors
    ///
    /// - [`Rejection::Empty`] for empty or whitespace-only input (not hashed).
    /// - [`Rejection::Hash`] if hashing failed.
    /// - [`Rejection::NoMatch`] if the digest is not in the allow-list.
    pub fn check(&self, candidate: &str) -> Result<(), Rejection> {
        if candidate.trim().is_empty() {
            return Err(Rejection::Empty);
        }

        let digest = self.digester.digest(&normalize(candidate))?;

        if self.allow_list.contains(&digest) {
            Ok(())
        } else {
            Err(Rejection::NoMatch)
        }
    }

    /// Whether `candidate` is a valid passcode. Any failure is `false`.
    pub fn verify(&self, candidate: &str) -> bool {
        match self.check(candidate) {
            Ok(()) => true,
            Err(reason) => {
                debug!(%reason, "passcode rejected");
                false
            }
        }
    }
}
