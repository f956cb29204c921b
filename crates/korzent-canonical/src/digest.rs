use sha2::{Digest, Sha256};

use crate::identifiers::HashRef;

/// The reserved all-zero reference meaning "intentionally absent".
pub const ZERO_HASH: &str =
    "sha256:0000000000000000000000000000000000000000000000000000000000000000";

/// SHA-256 of `bytes`.
pub fn sha256_bytes(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// SHA-256 of `bytes` as 64 lowercase hex digits.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(sha256_bytes(bytes))
}

/// SHA-256 of `bytes` as a `sha256:<hex>` reference.
pub fn sha256_ref(bytes: &[u8]) -> HashRef {
    HashRef::from_digest(sha256_bytes(bytes))
}

impl HashRef {
    /// Builds a reference from raw digest bytes.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        Self(format!("sha256:{}", hex::encode(digest)))
    }

    /// The reserved [`ZERO_HASH`] reference.
    pub fn zero() -> Self {
        Self(ZERO_HASH.to_string())
    }

    /// Returns `true` for [`ZERO_HASH`].
    pub fn is_zero(&self) -> bool {
        self.0 == ZERO_HASH
    }
}
