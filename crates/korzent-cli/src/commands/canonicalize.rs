//! Canonicalize command implementation.

use korzent_canonical::canonicalize;

use super::read_json;
use crate::error::CliError;
use crate::output::print_bytes;

pub fn run(input: Option<String>) -> Result<bool, CliError> {
    let value = read_json(input)?;
    print_bytes(&canonicalize(&value)?);
    Ok(true)
}
