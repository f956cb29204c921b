//! Receipt identity and Ed25519 signatures.
//!
//! Two digests are taken over the same canonical encoding:
//!
//! - `receipt_id = sha256_ref(canonical(record - {receipt_id, signature}))`
//! - `signature = ed25519(sha256(canonical(record - {signature})))`
//!
//! The identity never depends on a key; the signature binds the identity that
//! was assigned.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signer, SigningKey};
use korzent_canonical::{canonicalize, sha256_bytes, sha256_ref, CanonicalizationError, HashRef};
use serde_json::{Map, Value};

use crate::errors::SigningError;

/// Canonical bytes of a shallow copy of `record` without the `omit` keys.
fn canonical_without(
    record: &Map<String, Value>,
    omit: &[&str],
) -> Result<Vec<u8>, CanonicalizationError> {
    let mut view = record.clone();
    for key in omit {
        view.remove(*key);
    }
    canonicalize(&Value::Object(view))
}

/// Content-derived identity of a receipt record.
///
/// `receipt_id` and `signature` are ignored if present, so the result is the
/// same before and after sealing.
pub fn derive_receipt_id(record: &Map<String, Value>) -> Result<HashRef, CanonicalizationError> {
    let bytes = canonical_without(record, &["receipt_id", "signature"])?;
    Ok(sha256_ref(&bytes))
}

/// SHA-256 of the canonical record with only `signature` removed.
///
/// This 32-byte digest is the Ed25519 message.
pub fn signing_digest(record: &Map<String, Value>) -> Result<[u8; 32], CanonicalizationError> {
    let bytes = canonical_without(record, &["signature"])?;
    Ok(sha256_bytes(&bytes))
}

/// Signs a record, returning the signature as unpadded base64url text.
pub fn sign_receipt(
    record: &Map<String, Value>,
    signer: &ReceiptSigner,
) -> Result<String, SigningError> {
    let digest = signing_digest(record)?;
    Ok(URL_SAFE_NO_PAD.encode(signer.sign_digest(&digest)))
}

/// Ed25519 public key for a 32-byte private key.
pub fn derive_public_key(private_key: &[u8; 32]) -> [u8; 32] {
    SigningKey::from_bytes(private_key).verifying_key().to_bytes()
}

/// An issuer's Ed25519 signing key.
pub struct ReceiptSigner {
    key: SigningKey,
}

impl ReceiptSigner {
    /// Signer for a 32-byte private key.
    pub fn from_bytes(private_key: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(private_key),
        }
    }

    /// Signer for a private key of unchecked length.
    pub fn from_slice(private_key: &[u8]) -> Result<Self, SigningError> {
        let bytes: [u8; 32] = private_key
            .try_into()
            .map_err(|_| SigningError::InvalidPrivateKey(private_key.len()))?;
        Ok(Self::from_bytes(&bytes))
    }

    /// The matching public key.
    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    /// Raw 64-byte signature over a signing digest.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> [u8; 64] {
        self.key.sign(digest).to_bytes()
    }
}

impl std::fmt::Debug for ReceiptSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReceiptSigner(<private>)")
    }
}
