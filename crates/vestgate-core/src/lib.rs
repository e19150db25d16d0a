//! Core library for Vestgate.
//!
//! Contains the document passcode gate: the SHA-256 hashing utility, the
//! allow-list verifier, and the time-boxed session access store. Storage is
//! injected through `vestgate-storage`, and time through [`clock::Clock`], so
//! nothing here depends on a browser or on wall-clock time in tests.

pub mod access;
pub mod clock;
pub mod error;
pub mod hash;
pub mod passcode;
