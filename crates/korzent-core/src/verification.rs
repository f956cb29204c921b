//! Fail-closed receipt verification.
//!
//! A receipt is judged by a fixed chain of gates. The first gate that fails
//! decides the returned code, so the order below is part of the wire
//! contract:
//!
//! 1. header: object, protocol, version, schema pin, key ids, signature text
//! 2. common fields present, decision, timestamp, hash references
//! 3. zero-hash rules and variant-specific fields
//! 4. execution fields all-or-nothing
//! 5. recomputed `receipt_id`
//! 6. trust root, signing key, public key material
//! 7. signature length, decoding and Ed25519 check
//!
//! A field is *missing* when its key is absent, its value is `null`, or its
//! value is the empty string.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signature, VerifyingKey};
use korzent_canonical::{HashRef, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, trace};

use crate::errors::TrustRootError;
use crate::protocol::{
    COMMON_REQUIRED_FIELDS, DENY_MESSAGE_MAX_UNITS, EXECUTION_FIELDS, HASH_FIELDS, PROTOCOL,
    PROTOCOL_VERSION, SCHEMA_HASH, SIGNATURE_LEN, SIGNATURE_TEXT_LEN, ZERO_HASH,
};
use crate::receipt::{Decision, DenyCode, ExecutionPresence, ReceiptShape, ReceiptVariant};
use crate::signing::{derive_receipt_id, signing_digest};
use crate::trust::TrustRoots;

/// Reason a receipt was rejected. `Display` is the stable wire code.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The candidate is not a JSON object.
    #[error("ERR_RECEIPT_MALFORMED")]
    Malformed,
    /// `protocol` is missing.
    #[error("ERR_MISSING_PROTOCOL")]
    MissingProtocol,
    /// `protocol` is not `korzent`.
    #[error("ERR_PROTOCOL_MISMATCH")]
    ProtocolMismatch,
    /// `protocol_version` is missing.
    #[error("ERR_MISSING_PROTOCOL_VERSION")]
    MissingProtocolVersion,
    /// `protocol_version` is not supported.
    #[error("ERR_UNKNOWN_PROTOCOL_VERSION")]
    UnknownProtocolVersion,
    /// `schema_hash` is missing.
    #[error("ERR_SCHEMA_HASH_MISSING")]
    SchemaHashMissing,
    /// `schema_hash` differs from the pinned value.
    #[error("ERR_SCHEMA_HASH_MISMATCH")]
    SchemaHashMismatch,
    /// `trust_root_id` is missing.
    #[error("ERR_TRUST_ROOT_ID_MISSING")]
    TrustRootIdMissing,
    /// `trust_root_id` is not a string.
    #[error("ERR_TRUST_ROOT_ID_INVALID")]
    TrustRootIdInvalid,
    /// `signing_key_id` is missing.
    #[error("ERR_SIGNING_KEY_ID_MISSING")]
    SigningKeyIdMissing,
    /// `signing_key_id` is not a string.
    #[error("ERR_SIGNING_KEY_ID_INVALID")]
    SigningKeyIdInvalid,
    /// `signature` is missing.
    #[error("ERR_SIGNATURE_MISSING")]
    SignatureMissing,
    /// `signature` is malformed or does not verify.
    #[error("ERR_SIGNATURE_INVALID")]
    SignatureInvalid,
    /// A required field is missing.
    #[error("ERR_REQUIRED_FIELD_MISSING:{0}")]
    RequiredFieldMissing(&'static str),
    /// `decision` is unknown or contradicts the variant.
    #[error("ERR_DECISION_INVALID")]
    DecisionInvalid,
    /// `timestamp_utc` is not `YYYY-MM-DDTHH:MM:SS[.mmm]Z`.
    #[error("ERR_TIMESTAMP_UTC_INVALID")]
    TimestampInvalid,
    /// A hash field is not a `sha256:` reference.
    #[error("ERR_HASH_REF_INVALID:{0}")]
    HashRefInvalid(&'static str),
    /// A field holds the zero hash where it is not allowed.
    #[error("ERR_ZERO_HASH_FORBIDDEN:{0}")]
    ZeroHashForbidden(&'static str),
    /// `deny_code` is not an enumerated deny code.
    #[error("ERR_DENY_CODE_INVALID")]
    DenyCodeInvalid,
    /// `deny_message` is not a string of 1 to 256 UTF-16 code units.
    #[error("ERR_DENY_MESSAGE_INVALID")]
    DenyMessageInvalid,
    /// `receipt_id` does not match the content.
    #[error("ERR_RECEIPT_ID_MISMATCH")]
    ReceiptIdMismatch,
    /// `trust_root_id` is not in the registry.
    #[error("ERR_TRUST_ROOT_UNKNOWN")]
    TrustRootUnknown,
    /// `signing_key_id` is not in the trust root.
    #[error("ERR_SIGNING_KEY_UNKNOWN")]
    SigningKeyUnknown,
    /// The registered key does not decode to 32 bytes.
    #[error("ERR_PUBLIC_KEY_INVALID")]
    PublicKeyInvalid,
    /// The receipt could not be canonicalized.
    #[error("ERR_CANONICALIZATION_FAILED")]
    CanonicalizationFailed,
}

impl Rejection {
    /// The wire code.
    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl From<TrustRootError> for Rejection {
    fn from(err: TrustRootError) -> Self {
        match err {
            TrustRootError::UnknownTrustRoot => Rejection::TrustRootUnknown,
            TrustRootError::UnknownSigningKey => Rejection::SigningKeyUnknown,
            TrustRootError::InvalidPublicKey => Rejection::PublicKeyInvalid,
        }
    }
}

/// Outcome of one verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResult {
    /// `true` only if every gate passed.
    pub ok: bool,
    /// `OK`, or the rejection code.
    pub code: String,
}

impl VerifyResult {
    /// Code carried by an accepted receipt.
    pub const OK: &'static str = "OK";

    /// An accepted verdict.
    pub fn accepted() -> Self {
        Self {
            ok: true,
            code: Self::OK.to_string(),
        }
    }

    /// A rejected verdict.
    pub fn rejected(rejection: &Rejection) -> Self {
        Self {
            ok: false,
            code: rejection.code(),
        }
    }
}

impl From<Result<(), Rejection>> for VerifyResult {
    fn from(outcome: Result<(), Rejection>) -> Self {
        match outcome {
            Ok(()) => Self::accepted(),
            Err(rejection) => Self::rejected(&rejection),
        }
    }
}

/// Verifies receipts against a borrowed trust registry.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<'a> {
    trust_roots: &'a TrustRoots,
}

impl<'a> Verifier<'a> {
    /// Creates a verifier over `trust_roots`.
    pub fn new(trust_roots: &'a TrustRoots) -> Self {
        Self { trust_roots }
    }

    /// Judges one candidate receipt.
    pub fn verify(&self, candidate: &Value) -> VerifyResult {
        match self.check(candidate) {
            Ok(()) => {
                trace!("receipt accepted");
                VerifyResult::accepted()
            }
            Err(rejection) => {
                debug!(code = %rejection, "receipt rejected");
                VerifyResult::rejected(&rejection)
            }
        }
    }

    /// Runs every gate, returning the first failure.
    pub fn check(&self, candidate: &Value) -> Result<(), Rejection> {
        let record = candidate.as_object().ok_or(Rejection::Malformed)?;
        let header = check_header(record)?;
        let decision = check_common(record)?;
        let shape = ReceiptShape::classify(record);
        check_variant(record, shape, decision)?;
        check_execution(record, shape, decision)?;
        check_identity(record)?;
        let public_key = self
            .trust_roots
            .resolve(header.trust_root_id, header.signing_key_id)?;
        check_signature(record, header.signature, &public_key)
    }
}

/// Judges `candidate` against `trust_roots`.
pub fn verify_receipt(candidate: &Value, trust_roots: &TrustRoots) -> VerifyResult {
    Verifier::new(trust_roots).verify(candidate)
}

struct Header<'r> {
    trust_root_id: &'r str,
    signing_key_id: &'r str,
    signature: &'r str,
}

fn is_missing(record: &Map<String, Value>, field: &str) -> bool {
    match record.get(field) {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

fn str_field<'r>(record: &'r Map<String, Value>, field: &str) -> Option<&'r str> {
    record.get(field).and_then(Value::as_str)
}

fn non_empty_str<'r>(record: &'r Map<String, Value>, field: &str) -> Option<&'r str> {
    str_field(record, field).filter(|s| !s.is_empty())
}

fn is_hash_ref(record: &Map<String, Value>, field: &str) -> bool {
    str_field(record, field).is_some_and(HashRef::is_valid)
}

fn is_zero_hash(record: &Map<String, Value>, field: &str) -> bool {
    str_field(record, field) == Some(ZERO_HASH)
}

/// Present and equal to `expected`, else the missing or mismatch code.
fn require_literal(
    record: &Map<String, Value>,
    field: &str,
    expected: &str,
    missing: Rejection,
    mismatch: Rejection,
) -> Result<(), Rejection> {
    if is_missing(record, field) {
        return Err(missing);
    }
    if str_field(record, field) != Some(expected) {
        return Err(mismatch);
    }
    Ok(())
}

/// Present and a non-empty string, else the missing or invalid code.
fn require_text<'r>(
    record: &'r Map<String, Value>,
    field: &str,
    missing: Rejection,
    invalid: Rejection,
) -> Result<&'r str, Rejection> {
    if is_missing(record, field) {
        return Err(missing);
    }
    non_empty_str(record, field).ok_or(invalid)
}

fn check_header(record: &Map<String, Value>) -> Result<Header<'_>, Rejection> {
    require_literal(
        record,
        "protocol",
        PROTOCOL,
        Rejection::MissingProtocol,
        Rejection::ProtocolMismatch,
    )?;
    require_literal(
        record,
        "protocol_version",
        PROTOCOL_VERSION,
        Rejection::MissingProtocolVersion,
        Rejection::UnknownProtocolVersion,
    )?;
    require_literal(
        record,
        "schema_hash",
        SCHEMA_HASH,
        Rejection::SchemaHashMissing,
        Rejection::SchemaHashMismatch,
    )?;
    let trust_root_id = require_text(
        record,
        "trust_root_id",
        Rejection::TrustRootIdMissing,
        Rejection::TrustRootIdInvalid,
    )?;
    let signing_key_id = require_text(
        record,
        "signing_key_id",
        Rejection::SigningKeyIdMissing,
        Rejection::SigningKeyIdInvalid,
    )?;
    let signature = require_text(
        record,
        "signature",
        Rejection::SignatureMissing,
        Rejection::SignatureInvalid,
    )?;
    Ok(Header {
        trust_root_id,
        signing_key_id,
        signature,
    })
}

fn check_common(record: &Map<String, Value>) -> Result<Decision, Rejection> {
    if let Some(field) = COMMON_REQUIRED_FIELDS
        .into_iter()
        .find(|field| is_missing(record, field))
    {
        return Err(Rejection::RequiredFieldMissing(field));
    }

    let decision = str_field(record, "decision")
        .and_then(Decision::from_wire)
        .ok_or(Rejection::DecisionInvalid)?;

    if !str_field(record, "timestamp_utc").is_some_and(Timestamp::is_valid) {
        return Err(Rejection::TimestampInvalid);
    }

    if let Some(field) = HASH_FIELDS
        .into_iter()
        .find(|field| !is_hash_ref(record, field))
    {
        return Err(Rejection::HashRefInvalid(field));
    }

    if is_zero_hash(record, "intent_hash") {
        return Err(Rejection::ZeroHashForbidden("intent_hash"));
    }
    Ok(decision)
}

fn check_variant(
    record: &Map<String, Value>,
    shape: ReceiptShape,
    decision: Decision,
) -> Result<(), Rejection> {
    if shape.variant != ReceiptVariant::Attempt {
        for field in ["policy_pack_hash", "epoch_hash"] {
            if is_zero_hash(record, field) {
                return Err(Rejection::ZeroHashForbidden(field));
            }
        }
        return Ok(());
    }

    if decision != Decision::Deny {
        return Err(Rejection::DecisionInvalid);
    }
    if is_missing(record, "deny_code") {
        return Err(Rejection::RequiredFieldMissing("deny_code"));
    }
    if str_field(record, "deny_code")
        .and_then(DenyCode::from_wire)
        .is_none()
    {
        return Err(Rejection::DenyCodeInvalid);
    }
    if let Some(message) = record.get("deny_message") {
        // Astral-plane characters count twice.
        let units = message.as_str().map(|text| text.encode_utf16().count());
        if !units.is_some_and(|n| (1..=DENY_MESSAGE_MAX_UNITS).contains(&n)) {
            return Err(Rejection::DenyMessageInvalid);
        }
    }
    Ok(())
}

fn check_execution(
    record: &Map<String, Value>,
    shape: ReceiptShape,
    decision: Decision,
) -> Result<(), Rejection> {
    match shape.execution {
        ExecutionPresence::Absent => Ok(()),
        ExecutionPresence::Partial => match EXECUTION_FIELDS
            .into_iter()
            .find(|field| is_missing(record, field))
        {
            Some(field) => Err(Rejection::RequiredFieldMissing(field)),
            None => Ok(()),
        },
        ExecutionPresence::Complete => {
            if decision != Decision::Allow {
                return Err(Rejection::DecisionInvalid);
            }
            if !is_hash_ref(record, "parent_receipt_id") {
                return Err(Rejection::HashRefInvalid("parent_receipt_id"));
            }
            if non_empty_str(record, "action_driver").is_none() {
                return Err(Rejection::RequiredFieldMissing("action_driver"));
            }
            for field in ["payload_hash", "result_hash"] {
                if !is_hash_ref(record, field) {
                    return Err(Rejection::HashRefInvalid(field));
                }
            }
            Ok(())
        }
    }
}

fn check_identity(record: &Map<String, Value>) -> Result<(), Rejection> {
    let derived = derive_receipt_id(record).map_err(|_| Rejection::CanonicalizationFailed)?;
    if str_field(record, "receipt_id") != Some(derived.as_str()) {
        return Err(Rejection::ReceiptIdMismatch);
    }
    Ok(())
}

fn check_signature(
    record: &Map<String, Value>,
    signature: &str,
    public_key: &[u8; 32],
) -> Result<(), Rejection> {
    if signature.len() != SIGNATURE_TEXT_LEN {
        return Err(Rejection::SignatureInvalid);
    }
    let raw = URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|_| Rejection::SignatureInvalid)?;
    let raw: [u8; SIGNATURE_LEN] = raw.try_into().map_err(|_| Rejection::SignatureInvalid)?;

    let digest = signing_digest(record).map_err(|_| Rejection::CanonicalizationFailed)?;
    let key = VerifyingKey::from_bytes(public_key).map_err(|_| Rejection::SignatureInvalid)?;
    key.verify_strict(&digest, &Signature::from_bytes(&raw))
        .map_err(|_| Rejection::SignatureInvalid)
}
