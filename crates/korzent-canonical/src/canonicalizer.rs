use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Error returned when a value cannot be canonicalized.
///
/// Every variant is fatal for the value being encoded: a value that has no
/// canonical form cannot be hashed or signed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonicalizationError {
    /// Non-finite number (NaN/Infinity) detected.
    #[error("non-finite number at {0}")]
    NonFiniteNumber(JsonPath),
    /// The encoder failed to write a validated value.
    #[error("encoding failed: {0}")]
    Encoding(String),
}

/// JSON path to a value, rendered as `$`, `$.field`, `$.list[2]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
}

impl JsonPath {
    /// The document root (`$`).
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns the path of a member of the mapping at `self`.
    pub fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Field(field.to_string()));
        Self { segments }
    }

    /// Returns the path of an element of the sequence at `self`.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            match segment {
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

/// Produces the canonical bytes of `value`.
///
/// Keys are sorted by code point, no whitespace is emitted, strings use JSON
/// string-literal escaping and every number is written with the ECMAScript
/// `Number.prototype.toString` grammar. Integers beyond 2^53 are therefore
/// written as the nearest `f64`, the same text a JavaScript issuer produces.
///
/// # Example
///
/// ```rust
/// use korzent_canonical::canonicalize;
/// use serde_json::json;
///
/// let bytes = canonicalize(&json!({"b": 1, "a": {"nested": 2}}))?;
/// assert_eq!(bytes, br#"{"a":{"nested":2},"b":1}"#.to_vec());
/// # Ok::<(), korzent_canonical::CanonicalizationError>(())
/// ```
///
/// # Errors
///
/// Returns [`CanonicalizationError::NonFiniteNumber`] if a number has no
/// finite `f64` value.
pub fn canonicalize(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    canonicalize_at(value, &JsonPath::root())
}

/// Same as [`canonicalize`], reporting errors relative to `path`.
pub fn canonicalize_at(value: &Value, path: &JsonPath) -> Result<Vec<u8>, CanonicalizationError> {
    validate(value, path)?;

    let mut out = Vec::new();
    write_value(value, &mut out)?;
    Ok(out)
}

fn validate(value: &Value, path: &JsonPath) -> Result<(), CanonicalizationError> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                validate(child, &path.push_field(key))?;
            }
            Ok(())
        }
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                validate(item, &path.push_index(idx))?;
            }
            Ok(())
        }
        Value::Number(num) => match num.as_f64() {
            Some(f) if f.is_finite() => Ok(()),
            _ => Err(CanonicalizationError::NonFiniteNumber(path.clone())),
        },
        Value::String(_) | Value::Bool(_) | Value::Null => Ok(()),
    }
}

fn write_value(value: &Value, out: &mut Vec<u8>) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(num) => {
            let f = num
                .as_f64()
                .ok_or_else(|| CanonicalizationError::Encoding(format!("number {num}")))?;
            out.extend_from_slice(ryu_js::Buffer::new().format_finite(f).as_bytes());
        }
        Value::String(s) => write_str(s, out)?,
        Value::Array(items) => {
            out.push(b'[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(b',');
                }
                write_value(item, out)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            // Sorting `&str` keys orders by UTF-8 bytes, which is code point order.
            let sorted: BTreeMap<&str, &Value> =
                map.iter().map(|(key, child)| (key.as_str(), child)).collect();
            out.push(b'{');
            for (idx, (key, child)) in sorted.into_iter().enumerate() {
                if idx > 0 {
                    out.push(b',');
                }
                write_str(key, out)?;
                out.push(b':');
                write_value(child, out)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn write_str(s: &str, out: &mut Vec<u8>) -> Result<(), CanonicalizationError> {
    serde_json::to_writer(&mut *out, s)
        .map_err(|err| CanonicalizationError::Encoding(err.to_string()))
}
