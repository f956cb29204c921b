use korzent_canonical::{HashRef, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::SigningError;
use crate::protocol::{EXECUTION_FIELDS, PROTOCOL, PROTOCOL_VERSION, SCHEMA_DIGEST};
use crate::signing::{derive_receipt_id, sign_receipt, ReceiptSigner};

/// Policy outcome recorded in a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    /// The action was permitted.
    Allow,
    /// The action was refused.
    Deny,
}

impl Decision {
    /// Wire form of the decision.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Allow => "ALLOW",
            Decision::Deny => "DENY",
        }
    }

    /// Parses the exact wire form; anything else is `None`.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "ALLOW" => Some(Decision::Allow),
            "DENY" => Some(Decision::Deny),
            _ => None,
        }
    }
}

/// Reason an attempt was refused before or without execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyCode {
    /// Governed configuration was not available.
    MissingEnv,
    /// The request could not be interpreted.
    InvalidRequest,
    /// The gateway's trust root could not be resolved.
    TrustRootUnknown,
    /// The gateway's signing key could not be resolved.
    SigningKeyUnknown,
    /// No policy pack was loaded.
    PolicyMissing,
    /// No epoch was established.
    EpochMissing,
    /// The gateway failed internally.
    InternalError,
}

impl DenyCode {
    /// Every deny code, in wire enumeration order.
    pub const ALL: [DenyCode; 7] = [
        DenyCode::MissingEnv,
        DenyCode::InvalidRequest,
        DenyCode::TrustRootUnknown,
        DenyCode::SigningKeyUnknown,
        DenyCode::PolicyMissing,
        DenyCode::EpochMissing,
        DenyCode::InternalError,
    ];

    /// Wire form of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyCode::MissingEnv => "MISSING_ENV",
            DenyCode::InvalidRequest => "INVALID_REQUEST",
            DenyCode::TrustRootUnknown => "TRUST_ROOT_UNKNOWN",
            DenyCode::SigningKeyUnknown => "SIGNING_KEY_UNKNOWN",
            DenyCode::PolicyMissing => "POLICY_MISSING",
            DenyCode::EpochMissing => "EPOCH_MISSING",
            DenyCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Parses the exact wire form; anything else is `None`.
    pub fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_str() == value)
    }
}

/// Fields every issued receipt takes from its issuer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptHeader {
    /// Trust root the signing key belongs to.
    pub trust_root_id: String,
    /// Key id within the trust root.
    pub signing_key_id: String,
    /// Hash of the canonical intent.
    pub intent_hash: HashRef,
    /// Hash of the canonical request inputs.
    pub inputs_snapshot_hash: HashRef,
    /// Issuance time.
    pub timestamp_utc: Timestamp,
}

/// Execution-only fields, always carried together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFields {
    /// Receipt id of the evaluation that allowed this execution.
    pub parent_receipt_id: HashRef,
    /// Driver that carried out the action.
    pub action_driver: String,
    /// Hash of the payload handed to the driver.
    pub payload_hash: HashRef,
    /// Hash of the driver's result.
    pub result_hash: HashRef,
}

/// A receipt before identity derivation and signing.
///
/// Construct one with [`UnsignedReceipt::evaluate`],
/// [`UnsignedReceipt::attempt`] or [`UnsignedReceipt::execution`]; each
/// constructor fixes the fields its variant constrains. [`UnsignedReceipt::seal`]
/// turns it into a complete receipt document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsignedReceipt {
    /// Always [`PROTOCOL`].
    pub protocol: String,
    /// Always [`PROTOCOL_VERSION`].
    pub protocol_version: String,
    /// Always [`crate::protocol::SCHEMA_HASH`].
    pub schema_hash: HashRef,
    /// Trust root the signing key belongs to.
    pub trust_root_id: String,
    /// Hash of the canonical intent.
    pub intent_hash: HashRef,
    /// Hash of the governing policy pack (zero for attempts).
    pub policy_pack_hash: HashRef,
    /// Policy outcome.
    pub decision: Decision,
    /// Hash of the canonical request inputs.
    pub inputs_snapshot_hash: HashRef,
    /// Hash of the governing epoch (zero for attempts).
    pub epoch_hash: HashRef,
    /// Issuance time.
    pub timestamp_utc: Timestamp,
    /// Key id within the trust root.
    pub signing_key_id: String,
    /// Attempt-only deny reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny_code: Option<DenyCode>,
    /// Attempt-only human-readable detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deny_message: Option<String>,
    /// Execution-only fields.
    #[serde(flatten)]
    pub execution: Option<ExecutionFields>,
}

impl UnsignedReceipt {
    fn base(
        header: ReceiptHeader,
        decision: Decision,
        policy_pack_hash: HashRef,
        epoch_hash: HashRef,
    ) -> Self {
        Self {
            protocol: PROTOCOL.to_string(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            schema_hash: HashRef::from_digest(SCHEMA_DIGEST),
            trust_root_id: header.trust_root_id,
            intent_hash: header.intent_hash,
            policy_pack_hash,
            decision,
            inputs_snapshot_hash: header.inputs_snapshot_hash,
            epoch_hash,
            timestamp_utc: header.timestamp_utc,
            signing_key_id: header.signing_key_id,
            deny_code: None,
            deny_message: None,
            execution: None,
        }
    }

    /// An evaluation receipt recording a policy decision.
    pub fn evaluate(
        header: ReceiptHeader,
        decision: Decision,
        policy_pack_hash: HashRef,
        epoch_hash: HashRef,
    ) -> Self {
        Self::base(header, decision, policy_pack_hash, epoch_hash)
    }

    /// An attempt receipt: always `DENY`, with zero policy and epoch hashes.
    pub fn attempt(header: ReceiptHeader, deny_code: DenyCode, deny_message: Option<String>) -> Self {
        let mut receipt = Self::base(header, Decision::Deny, HashRef::zero(), HashRef::zero());
        receipt.deny_code = Some(deny_code);
        receipt.deny_message = deny_message;
        receipt
    }

    /// An execution receipt: always `ALLOW`, carrying all execution fields.
    pub fn execution(
        header: ReceiptHeader,
        policy_pack_hash: HashRef,
        epoch_hash: HashRef,
        fields: ExecutionFields,
    ) -> Self {
        let mut receipt = Self::base(header, Decision::Allow, policy_pack_hash, epoch_hash);
        receipt.execution = Some(fields);
        receipt
    }

    /// The receipt as a JSON object.
    pub fn to_record(&self) -> Result<Map<String, Value>, SigningError> {
        match serde_json::to_value(self)? {
            Value::Object(record) => Ok(record),
            _ => Err(SigningError::NotAnObject),
        }
    }

    /// Content-derived identity this receipt will carry once sealed.
    pub fn receipt_id(&self) -> Result<HashRef, SigningError> {
        Ok(derive_receipt_id(&self.to_record()?)?)
    }

    /// Derives `receipt_id`, signs, and returns the complete receipt.
    pub fn seal(&self, signer: &ReceiptSigner) -> Result<Value, SigningError> {
        let mut record = self.to_record()?;
        let receipt_id = derive_receipt_id(&record)?;
        record.insert("receipt_id".to_string(), Value::String(receipt_id.into()));
        let signature = sign_receipt(&record, signer)?;
        record.insert("signature".to_string(), Value::String(signature));
        Ok(Value::Object(record))
    }
}

/// Structural receipt variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptVariant {
    /// No deny fields and not all execution fields.
    Evaluate,
    /// `deny_code` or `deny_message` present.
    Attempt,
    /// All four execution fields present and no deny fields.
    Execution,
}

/// How many of the execution fields a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionPresence {
    /// None of the four.
    Absent,
    /// One, two or three of the four.
    Partial,
    /// All four.
    Complete,
}

/// Structural classification of a receipt record, computed once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiptShape {
    /// Variant the record belongs to.
    pub variant: ReceiptVariant,
    /// Execution field presence, independent of the variant.
    pub execution: ExecutionPresence,
}

impl ReceiptShape {
    /// Classifies a record by key presence alone; values are not inspected.
    pub fn classify(record: &Map<String, Value>) -> Self {
        let present = EXECUTION_FIELDS
            .iter()
            .filter(|field| record.contains_key(**field))
            .count();
        let execution = match present {
            0 => ExecutionPresence::Absent,
            n if n == EXECUTION_FIELDS.len() => ExecutionPresence::Complete,
            _ => ExecutionPresence::Partial,
        };
        let variant = if record.contains_key("deny_code") || record.contains_key("deny_message") {
            ReceiptVariant::Attempt
        } else if execution == ExecutionPresence::Complete {
            ReceiptVariant::Execution
        } else {
            ReceiptVariant::Evaluate
        };
        Self { variant, execution }
    }
}
