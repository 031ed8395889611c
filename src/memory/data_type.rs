//! Declared data types for simulated allocations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Width of the fixed-size numeric encodings (64-bit).
pub const WORD_SIZE: usize = 8;

/// The type a caller declares for the text it submits.
///
/// Integer and Float have a fixed encoded width. String and Array are
/// variable: their width is the UTF-8 length of the canonical text plus one
/// terminator byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Integer,
    Float,
    Array,
}

impl DataType {
    /// All variants, in display order.
    pub const ALL: [DataType; 4] = [
        DataType::String,
        DataType::Integer,
        DataType::Float,
        DataType::Array,
    ];

    /// Fixed encoded width, or `None` for variable-width types.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            DataType::Integer | DataType::Float => Some(WORD_SIZE),
            DataType::String | DataType::Array => None,
        }
    }

    /// Whether the encoding carries a trailing `0x00` terminator.
    pub fn is_terminated(&self) -> bool {
        self.fixed_width().is_none()
    }

    /// Lowercase name, used as a metric label and in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::String => "string",
            DataType::Integer => "integer",
            DataType::Float => "float",
            DataType::Array => "array",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Ok(DataType::String),
            "integer" | "int" => Ok(DataType::Integer),
            "float" | "double" => Ok(DataType::Float),
            "array" => Ok(DataType::Array),
            other => Err(Error::InvalidArgument(format!(
                "Unknown data type: {}",
                other
            ))),
        }
    }
}
