use std::collections::BTreeMap;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::errors::TrustRootError;
use crate::protocol::PUBLIC_KEY_LEN;

/// base64url, padded or not.
const KEY_TEXT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Public key material as registered by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    /// Raw key bytes.
    Raw(Vec<u8>),
    /// base64url text, with or without padding.
    Text(String),
}

impl KeyMaterial {
    /// Decodes the material to a 32-byte public key.
    pub fn decode(&self) -> Result<[u8; 32], TrustRootError> {
        let bytes = match self {
            KeyMaterial::Raw(bytes) => bytes.clone(),
            KeyMaterial::Text(text) => KEY_TEXT
                .decode(text)
                .map_err(|_| TrustRootError::InvalidPublicKey)?,
        };
        <[u8; PUBLIC_KEY_LEN]>::try_from(bytes).map_err(|_| TrustRootError::InvalidPublicKey)
    }

    /// Empty text registers no key at all.
    fn is_blank(&self) -> bool {
        matches!(self, KeyMaterial::Text(text) if text.is_empty())
    }
}

impl From<[u8; 32]> for KeyMaterial {
    fn from(bytes: [u8; 32]) -> Self {
        KeyMaterial::Raw(bytes.to_vec())
    }
}

impl From<Vec<u8>> for KeyMaterial {
    fn from(bytes: Vec<u8>) -> Self {
        KeyMaterial::Raw(bytes)
    }
}

impl From<String> for KeyMaterial {
    fn from(text: String) -> Self {
        KeyMaterial::Text(text)
    }
}

impl From<&str> for KeyMaterial {
    fn from(text: &str) -> Self {
        KeyMaterial::Text(text.to_string())
    }
}

/// Caller-owned registry: trust root id, then signing key id, then key.
///
/// The verifier only reads it; one registry may serve any number of
/// concurrent verifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrustRoots {
    roots: BTreeMap<String, BTreeMap<String, KeyMaterial>>,
}

impl TrustRoots {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`TrustRoots::insert`].
    pub fn with_key(
        mut self,
        trust_root_id: impl Into<String>,
        signing_key_id: impl Into<String>,
        material: impl Into<KeyMaterial>,
    ) -> Self {
        self.insert(trust_root_id, signing_key_id, material);
        self
    }

    /// Registers a key, returning any material it replaced.
    pub fn insert(
        &mut self,
        trust_root_id: impl Into<String>,
        signing_key_id: impl Into<String>,
        material: impl Into<KeyMaterial>,
    ) -> Option<KeyMaterial> {
        self.roots
            .entry(trust_root_id.into())
            .or_default()
            .insert(signing_key_id.into(), material.into())
    }

    /// Returns `true` if no trust root is registered.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Looks up registered material without decoding it.
    ///
    /// An empty text entry counts as unregistered.
    pub fn lookup(
        &self,
        trust_root_id: &str,
        signing_key_id: &str,
    ) -> Result<&KeyMaterial, TrustRootError> {
        self.roots
            .get(trust_root_id)
            .ok_or(TrustRootError::UnknownTrustRoot)?
            .get(signing_key_id)
            .filter(|material| !material.is_blank())
            .ok_or(TrustRootError::UnknownSigningKey)
    }

    /// Resolves and decodes the public key for a receipt's key ids.
    pub fn resolve(
        &self,
        trust_root_id: &str,
        signing_key_id: &str,
    ) -> Result<[u8; 32], TrustRootError> {
        self.lookup(trust_root_id, signing_key_id)?.decode()
    }
}

/// First usable token of a trust-root text file.
///
/// Lines are trimmed; blank lines and lines starting with `#` are skipped.
pub fn read_key_token(text: &str) -> Option<&str> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
}
