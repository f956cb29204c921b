use korzent_canonical::CanonicalizationError;
use thiserror::Error;

/// Errors raised while deriving identities or signing receipts.
#[derive(Error, Debug)]
pub enum SigningError {
    /// The record could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
    /// A typed receipt could not be turned into a JSON document.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Receipts are JSON objects; anything else cannot be signed.
    #[error("receipt record must be a JSON object")]
    NotAnObject,
    /// Ed25519 private keys are exactly 32 bytes.
    #[error("private key must be 32 bytes, got {0}")]
    InvalidPrivateKey(usize),
}

/// Errors raised while resolving a public key from a trust registry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustRootError {
    /// No trust root is registered under the requested id.
    #[error("unknown trust root")]
    UnknownTrustRoot,
    /// The trust root exists but holds no key under the requested id.
    #[error("unknown signing key")]
    UnknownSigningKey,
    /// The key material does not decode to a 32-byte public key.
    #[error("public key material is not 32 bytes")]
    InvalidPublicKey,
}
