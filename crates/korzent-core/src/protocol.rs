//! Wire constants of the Korzent receipt protocol, version 1.

pub use korzent_canonical::ZERO_HASH;

/// Value of the `protocol` field.
pub const PROTOCOL: &str = "korzent";

/// Value of the `protocol_version` field.
pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Pinned canonical hash of the v1 receipt JSON Schema document.
pub const SCHEMA_HASH: &str =
    "sha256:103e0121f3f5b71b9a6a8489feb7159c0e99518f1bb0f5fbee6e1709ec16f40f";

/// Raw digest bytes of [`SCHEMA_HASH`].
pub const SCHEMA_DIGEST: [u8; 32] = [
    0x10, 0x3e, 0x01, 0x21, 0xf3, 0xf5, 0xb7, 0x1b,
    0x9a, 0x6a, 0x84, 0x89, 0xfe, 0xb7, 0x15, 0x9c,
    0x0e, 0x99, 0x51, 0x8f, 0x1b, 0xb0, 0xf5, 0xfb,
    0xee, 0x6e, 0x17, 0x09, 0xec, 0x16, 0xf4, 0x0f,
];

/// Length of a signature in its unpadded base64url text form.
pub const SIGNATURE_TEXT_LEN: usize = 86;

/// Length of a raw Ed25519 signature.
pub const SIGNATURE_LEN: usize = 64;

/// Length of a raw Ed25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;

/// Upper bound on `deny_message`, in UTF-16 code units.
pub const DENY_MESSAGE_MAX_UNITS: usize = 256;

/// Fields every receipt variant carries besides the header fields.
pub const COMMON_REQUIRED_FIELDS: [&str; 7] = [
    "receipt_id",
    "intent_hash",
    "policy_pack_hash",
    "decision",
    "inputs_snapshot_hash",
    "epoch_hash",
    "timestamp_utc",
];

/// Fields that must hold a `sha256:` reference, in checking order.
pub const HASH_FIELDS: [&str; 6] = [
    "schema_hash",
    "receipt_id",
    "intent_hash",
    "policy_pack_hash",
    "inputs_snapshot_hash",
    "epoch_hash",
];

/// Execution-only fields; all four or none.
pub const EXECUTION_FIELDS: [&str; 4] = [
    "parent_receipt_id",
    "action_driver",
    "payload_hash",
    "result_hash",
];
