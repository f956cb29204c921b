//! Receipt-id command implementation.

use korzent_core::{derive_receipt_id, SigningError};

use super::read_json;
use crate::error::CliError;

pub fn run(input: Option<String>) -> Result<bool, CliError> {
    let value = read_json(input)?;
    let record = value.as_object().ok_or(SigningError::NotAnObject)?;
    println!("{}", derive_receipt_id(record)?);
    Ok(true)
}
