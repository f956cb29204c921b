//! Verify command implementation.
//!
//! The registry holds a single key, filed under the receipt's own
//! `trust_root_id` and `signing_key_id`; the verdict is whether that key
//! signed the receipt.

use std::fs;
use std::path::Path;

use korzent_core::{read_key_token, verify_receipt, TrustRoots, VerifyResult};
use serde_json::Value;
use tracing::debug;

use crate::error::CliError;
use crate::output::print_verdict;

pub fn run(receipt_path: &Path, trust_root: &str, json_output: bool) -> Result<bool, CliError> {
    let result = match check(receipt_path, trust_root) {
        Ok(result) => result,
        Err(err) => {
            debug!(error = %err, "receipt not verified");
            VerifyResult {
                ok: false,
                code: err.to_string(),
            }
        }
    };
    print_verdict(&result, json_output)?;
    Ok(result.ok)
}

fn check(receipt_path: &Path, trust_root: &str) -> Result<VerifyResult, CliError> {
    let receipt = load_receipt(receipt_path)?;
    let trust_roots = build_trust_roots(&receipt, trust_root)?;
    Ok(verify_receipt(&receipt, &trust_roots))
}

fn load_receipt(path: &Path) -> Result<Value, CliError> {
    if !path.exists() {
        return Err(CliError::ReceiptNotFound(path.display().to_string()));
    }
    let text = fs::read_to_string(path).map_err(|e| CliError::ReceiptParse(e.to_string()))?;
    let value: Value =
        serde_json::from_str(&text).map_err(|e| CliError::ReceiptParse(e.to_string()))?;
    if !value.is_object() {
        return Err(CliError::ReceiptMalformed);
    }
    Ok(value)
}

fn build_trust_roots(receipt: &Value, trust_root: &str) -> Result<TrustRoots, CliError> {
    let trust_root_id = id_field(receipt, "trust_root_id").ok_or(CliError::TrustRootIdMissing)?;
    let signing_key_id =
        id_field(receipt, "signing_key_id").ok_or(CliError::SigningKeyIdMissing)?;
    let token = read_trust_root_value(trust_root)?;
    Ok(TrustRoots::new().with_key(trust_root_id, signing_key_id, token))
}

fn id_field<'r>(receipt: &'r Value, field: &str) -> Option<&'r str> {
    receipt
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Reads the token from `value` as a file if one exists there, else uses
/// `value` itself.
fn read_trust_root_value(value: &str) -> Result<String, CliError> {
    let path = Path::new(value);
    let token = if path.is_file() {
        let text = fs::read_to_string(path).map_err(|source| CliError::Io {
            path: value.to_string(),
            source,
        })?;
        read_key_token(&text).unwrap_or_default().to_string()
    } else {
        value.trim().to_string()
    };
    if token.is_empty() {
        return Err(CliError::TrustRootValueEmpty);
    }
    Ok(token)
}
