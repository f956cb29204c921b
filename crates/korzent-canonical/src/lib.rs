//! Canonical encoding and content addressing for Korzent receipts.
//!
//! Every byte that is hashed or signed anywhere in Korzent is produced by
//! [`canonicalize`]. The encoding is deterministic: identical logical content
//! yields identical bytes regardless of key insertion order, so independent
//! verifiers reproduce the same digests.
//!
#![deny(missing_docs)]

/// Canonical byte encoding of JSON values.
pub mod canonicalizer;
/// SHA-256 helpers and hash reference constructors.
pub mod digest;
/// Pattern-validated newtypes (`HashRef`, `Timestamp`) and their errors.
pub mod identifiers;

pub use canonicalizer::{canonicalize, canonicalize_at, CanonicalizationError, JsonPath};
pub use digest::{sha256_bytes, sha256_hex, sha256_ref, ZERO_HASH};
pub use identifiers::{HashRef, Timestamp, ValidationError};
