use korzent_canonical::CanonicalizationError;
use korzent_core::SigningError;
use thiserror::Error;

/// Failures before a receipt reaches the verifier, plus I/O around it.
///
/// The `ERR_CLI_*` variants are printed as verdict codes by `verify`.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("ERR_CLI_RECEIPT_NOT_FOUND: {0}")]
    ReceiptNotFound(String),
    #[error("ERR_CLI_RECEIPT_PARSE: {0}")]
    ReceiptParse(String),
    #[error("ERR_CLI_RECEIPT_MALFORMED")]
    ReceiptMalformed,
    #[error("ERR_CLI_TRUST_ROOT_ID_MISSING")]
    TrustRootIdMissing,
    #[error("ERR_CLI_SIGNING_KEY_ID_MISSING")]
    SigningKeyIdMissing,
    #[error("ERR_CLI_TRUST_ROOT_VALUE_EMPTY")]
    TrustRootValueEmpty,
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
    #[error(transparent)]
    Signing(#[from] SigningError),
}
