//! Receipt model, signing, trust roots and verification for Korzent.
//!
//! This crate provides:
//! - Protocol constants and the typed issuer-side receipt model
//! - Receipt identity derivation and Ed25519 signing over canonical bytes
//! - A caller-owned trust registry resolving `(trust_root_id, signing_key_id)`
//! - The fail-closed verifier returning `{ ok, code }`
//!
//! Core invariants:
//! - `receipt_id` is `sha256_ref` of the canonical receipt without
//!   `receipt_id` and `signature`
//! - The signature covers the SHA-256 of the canonical receipt without
//!   `signature`
//! - Verification is deterministic, offline and stateless; rejections are
//!   returned as data, never raised
//!
#![deny(missing_docs)]

/// Error types for signing and trust resolution.
pub mod errors;
/// Wire constants of protocol version 1.
pub mod protocol;
/// Typed receipts and structural classification.
pub mod receipt;
/// Receipt identity and Ed25519 signatures.
pub mod signing;
/// Trust registry and key material.
pub mod trust;
/// The ordered verification gates.
pub mod verification;

pub use errors::{SigningError, TrustRootError};
pub use receipt::{
    Decision, DenyCode, ExecutionFields, ExecutionPresence, ReceiptHeader, ReceiptShape,
    ReceiptVariant, UnsignedReceipt,
};
pub use signing::{derive_public_key, derive_receipt_id, sign_receipt, signing_digest, ReceiptSigner};
pub use trust::{read_key_token, KeyMaterial, TrustRoots};
pub use verification::{verify_receipt, Rejection, Verifier, VerifyResult};
