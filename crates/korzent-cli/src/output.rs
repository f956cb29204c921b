//! Output formatting utilities.

use korzent_core::VerifyResult;

use crate::error::CliError;

/// Prints a verdict as `VALID <code>` / `INVALID <code>`, or as JSON.
pub fn print_verdict(result: &VerifyResult, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string(result)?);
    } else if result.ok {
        println!("VALID {}", result.code);
    } else {
        println!("INVALID {}", result.code);
    }
    Ok(())
}

/// Prints canonical bytes followed by a newline.
pub fn print_bytes(bytes: &[u8]) {
    println!("{}", String::from_utf8_lossy(bytes));
}
