pub mod canonicalize;
pub mod receipt_id;
pub mod verify;

use std::io::{self, Read};

use serde_json::Value;

use crate::error::CliError;

/// Reads JSON from a file, or from stdin when no path is given.
pub fn read_json(input: Option<String>) -> Result<Value, CliError> {
    let json_str = if let Some(path) = input {
        std::fs::read_to_string(&path).map_err(|source| CliError::Io { path, source })?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|source| CliError::Io {
                path: "<stdin>".to_string(),
                source,
            })?;
        buffer
    };
    Ok(serde_json::from_str(&json_str)?)
}
