//! Input validation and canonical byte encoding
//!
//! Turns raw user text plus a declared [`DataType`] into a canonical
//! [`Value`], and a `Value` into the bytes it would occupy in raw memory.
//!
//! # Layouts
//!
//! ```text
//! String  "hi"          → 68 69 00                      (UTF-8 + terminator)
//! Integer 1             → 00 00 00 00 00 00 00 01       (i64, big-endian)
//! Float   1.5           → 3F F8 00 00 00 00 00 00       (IEEE-754, big-endian)
//! Array   "1, 2, apple" → "[1, 2, apple]" as a String   (text + terminator)
//! ```
//!
//! Parsing happens once, in [`Value::parse`]. Everything downstream of a
//! successfully parsed `Value` is total.

use serde::Serialize;
use std::fmt::Write as _;

use super::data_type::{DataType, WORD_SIZE};
use crate::error::{Error, Result};

const TERMINATOR: u8 = 0x00;

/// A validated value in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    /// Canonical bracketed text, e.g. `[1, 2, apple]`.
    Array(String),
}

impl Value {
    /// Validate `text` against `data_type` and build its canonical value.
    pub fn parse(text: &str, data_type: DataType) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(invalid(data_type, "input is empty"));
        }

        match data_type {
            DataType::String => Ok(Value::String(trimmed.to_string())),
            DataType::Integer => trimmed.parse::<i64>().map(Value::Integer).map_err(|e| {
                invalid(data_type, format!("not a 64-bit signed integer ({})", e))
            }),
            DataType::Float => trimmed.parse::<f64>().map(Value::Float).map_err(|e| {
                invalid(data_type, format!("not a 64-bit float ({})", e))
            }),
            DataType::Array => parse_array(trimmed).map(Value::Array),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Value::String(_) => DataType::String,
            Value::Integer(_) => DataType::Integer,
            Value::Float(_) => DataType::Float,
            Value::Array(_) => DataType::Array,
        }
    }

    /// Canonical text form, stored as a block's content.
    pub fn content(&self) -> String {
        match self {
            Value::String(s) | Value::Array(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
        }
    }

    /// Number of bytes [`Value::to_bytes`] produces.
    pub fn size(&self) -> usize {
        match self {
            Value::String(s) | Value::Array(s) => s.len() + 1,
            Value::Integer(_) | Value::Float(_) => WORD_SIZE,
        }
    }

    /// Raw memory layout of this value.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Value::String(s) | Value::Array(s) => {
                let mut bytes = Vec::with_capacity(s.len() + 1);
                bytes.extend_from_slice(s.as_bytes());
                bytes.push(TERMINATOR);
                bytes
            }
            Value::Integer(i) => i.to_be_bytes().to_vec(),
            Value::Float(f) => f.to_bits().to_be_bytes().to_vec(),
        }
    }
}

/// Whether `text` is acceptable input for `data_type`.
pub fn validate(text: &str, data_type: DataType) -> bool {
    check(text, data_type).is_ok()
}

/// Like [`validate`], but reports why the input was rejected.
pub fn check(text: &str, data_type: DataType) -> Result<()> {
    Value::parse(text, data_type).map(|_| ())
}

/// Canonical content for `text`.
pub fn normalize(text: &str, data_type: DataType) -> Result<String> {
    Value::parse(text, data_type).map(|value| value.content())
}

/// Encoded size of `content`, canonicalized first like [`encode`].
pub fn size_of(content: &str, data_type: DataType) -> Result<usize> {
    Value::parse(content, data_type).map(|value| value.size())
}

/// Byte layout of `content` interpreted as `data_type`.
///
/// `content` goes through [`Value::parse`] first, so non-canonical text
/// (surrounding whitespace, missing array brackets) encodes as its
/// canonical form, and always agrees with [`size_of`].
pub fn encode(content: &str, data_type: DataType) -> Result<Vec<u8>> {
    Value::parse(content, data_type).map(|value| value.to_bytes())
}

/// Space-separated uppercase hex pairs, e.g. `68 69 00`.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:02X}", byte);
    }
    out
}

/// Shortest text that parses back to the same `f64`, keeping a decimal
/// point or exponent so the value still reads as a float.
fn format_float(value: f64) -> String {
    format!("{:?}", value)
}

fn parse_array(trimmed: &str) -> Result<String> {
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(trimmed)
        .trim();

    for (index, element) in inner.split(',').map(str::trim).enumerate() {
        if element.is_empty() {
            return Err(invalid(
                DataType::Array,
                format!("element {} is empty", index),
            ));
        }
        if !is_array_element(element) {
            return Err(invalid(
                DataType::Array,
                format!("element {} ({:?}) is not a number or bare token", index, element),
            ));
        }
    }

    Ok(format!("[{}]", inner))
}

fn is_array_element(element: &str) -> bool {
    element.parse::<i64>().is_ok() || element.parse::<f64>().is_ok() || is_bare_token(element)
}

/// Letters, digits, `_` and `-` only.
fn is_bare_token(element: &str) -> bool {
    element
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

fn invalid(data_type: DataType, reason: impl Into<String>) -> Error {
    Error::InvalidInput {
        data_type,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_rejected_for_every_type() {
        for ty in DataType::ALL {
            assert!(!validate("", ty), "{} accepted empty input", ty);
            assert!(!validate("   \t\n", ty), "{} accepted blank input", ty);
        }
    }

    #[test]
    fn test_string_validation_and_normalization() {
        assert!(validate("hello world", DataType::String));
        assert_eq!(normalize("  hello world \n", DataType::String).unwrap(), "hello world");
    }

    #[test]
    fn test_integer_validation() {
        assert!(validate("42", DataType::Integer));
        assert!(validate("-42", DataType::Integer));
        assert!(validate("+7", DataType::Integer));
        assert!(validate("9223372036854775807", DataType::Integer));
        assert!(validate("-9223372036854775808", DataType::Integer));

        assert!(!validate("9223372036854775808", DataType::Integer));
        assert!(!validate("1.5", DataType::Integer));
        assert!(!validate("12abc", DataType::Integer));
        assert!(!validate("1 2", DataType::Integer));
    }

    #[test]
    fn test_integer_normalization() {
        assert_eq!(normalize("007", DataType::Integer).unwrap(), "7");
        assert_eq!(normalize("+15", DataType::Integer).unwrap(), "15");
        assert_eq!(normalize("-0", DataType::Integer).unwrap(), "0");
        assert_eq!(normalize(" -120 ", DataType::Integer).unwrap(), "-120");
    }

    #[test]
    fn test_integer_normalization_preserves_value() {
        for text in ["0", "00012", "+9", "-9223372036854775808", "123456789"] {
            let original: i64 = text.parse().unwrap();
            let normalized = normalize(text, DataType::Integer).unwrap();
            assert_eq!(normalized.parse::<i64>().unwrap(), original);
        }
    }

    #[test]
    fn test_float_validation_and_normalization() {
        assert!(validate("3.14", DataType::Float));
        assert!(validate("1e10", DataType::Float));
        assert!(validate("-2.5E-3", DataType::Float));
        assert!(validate("5", DataType::Float));
        assert!(!validate("3.14.15", DataType::Float));
        assert!(!validate("pi", DataType::Float));

        assert_eq!(normalize("5", DataType::Float).unwrap(), "5.0");
        assert_eq!(normalize("2.500", DataType::Float).unwrap(), "2.5");
        assert_eq!(normalize("1e300", DataType::Float).unwrap(), "1e300");
        assert_eq!(normalize("+0.1", DataType::Float).unwrap(), "0.1");
    }

    #[test]
    fn test_array_mixed_elements() {
        assert!(validate("1, 2, apple", DataType::Array));
        assert_eq!(normalize("1, 2, apple", DataType::Array).unwrap(), "[1, 2, apple]");
        assert_eq!(normalize("[1, 2.5, x_y-z]", DataType::Array).unwrap(), "[1, 2.5, x_y-z]");
        assert_eq!(normalize("  [ a,b ]  ", DataType::Array).unwrap(), "[a,b]");
    }

    #[test]
    fn test_array_rejections() {
        assert!(!validate("1,,3", DataType::Array));
        assert!(!validate("[]", DataType::Array));
        assert!(!validate("1, 2,", DataType::Array));
        assert!(!validate("hello world, 2", DataType::Array));
        assert!(!validate("a.b", DataType::Array));
        assert!(!validate("[", DataType::Array));
    }

    #[test]
    fn test_rejection_carries_reason() {
        match check("1,,3", DataType::Array) {
            Err(Error::InvalidInput { data_type, reason }) => {
                assert_eq!(data_type, DataType::Array);
                assert!(reason.contains("empty"));
            }
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_encoding_is_big_endian() {
        assert_eq!(
            encode("1", DataType::Integer).unwrap(),
            vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]
        );
        assert_eq!(encode("-1", DataType::Integer).unwrap(), vec![0xFF; 8]);
        assert_eq!(
            encode("256", DataType::Integer).unwrap(),
            vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00]
        );
    }

    #[test]
    fn test_float_encoding_is_ieee754_big_endian() {
        assert_eq!(
            encode("1.5", DataType::Float).unwrap(),
            vec![0x3F, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            encode("-2.0", DataType::Float).unwrap(),
            vec![0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_string_and_array_encoding_terminated() {
        assert_eq!(encode("hi", DataType::String).unwrap(), vec![0x68, 0x69, 0x00]);
        assert_eq!(size_of("hi", DataType::String).unwrap(), 3);

        let bytes = encode("[1]", DataType::Array).unwrap();
        assert_eq!(bytes, vec![b'[', b'1', b']', 0x00]);
        assert_eq!(size_of("[1]", DataType::Array).unwrap(), 4);
    }

    #[test]
    fn test_size_matches_encoding() {
        let inputs = [
            ("héllo", DataType::String),
            ("-77", DataType::Integer),
            ("6.02e23", DataType::Float),
            ("x, 1, -2.5", DataType::Array),
        ];
        for (text, ty) in inputs {
            let content = normalize(text, ty).unwrap();
            assert_eq!(size_of(&content, ty).unwrap(), encode(&content, ty).unwrap().len());
        }
    }

    #[test]
    fn test_multibyte_size_counts_utf8_bytes() {
        // 'é' is two bytes in UTF-8
        assert_eq!(size_of("é", DataType::String).unwrap(), 3);
    }

    #[test]
    fn test_size_and_encoding_agree_on_raw_text() {
        let inputs = [
            ("  x  ", DataType::String),
            (" 1, 2 ", DataType::Array),
            (" +0007 ", DataType::Integer),
            ("1e3", DataType::Float),
        ];
        for (text, ty) in inputs {
            assert_eq!(
                size_of(text, ty).unwrap(),
                encode(text, ty).unwrap().len(),
                "disagreement for {:?}",
                text
            );
        }
        assert_eq!(size_of("  x  ", DataType::String).unwrap(), 2);
        assert_eq!(size_of(" 1, 2 ", DataType::Array).unwrap(), "[1, 2]".len() + 1);
        assert!(size_of("", DataType::String).is_err());
    }

    #[test]
    fn test_hex_dump() {
        assert_eq!(hex_dump(&[0x68, 0x69, 0x00]), "68 69 00");
        assert_eq!(hex_dump(&[0xFF]), "FF");
        assert_eq!(hex_dump(&[]), "");
    }
}
