//! Cell value types

use std::fmt;

/// A scalar stored in one cell
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Numeric value
    Number(f64),
    /// Text value, exactly as entered remotely
    Text(String),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Get as number if this is a numeric value
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    /// Get as string slice if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Number(_) => None,
        }
    }

    /// The textual form sent to the remote service as cell input
    pub fn to_input(&self) -> String {
        self.to_string()
    }

}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

/// Which decoding of a sheet a read operates on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueMode {
    /// Cells parsed as numbers
    Numeric,
    /// Cells kept as raw text
    Text,
}

/// An element type a dense matrix can be read into or written from
///
/// Implemented for `f64` (numeric mode) and `String` (text mode). The mode
/// decides which cached decoding of a sheet a read uses.
pub trait CellElement: Clone {
    /// Decoding this element type reads from
    const MODE: ValueMode;

    /// Convert a stored cell into this element type
    fn from_cell(value: &CellValue) -> Option<Self>;

    /// Textual form submitted to the remote service
    fn to_input(&self) -> String;
}

impl CellElement for f64 {
    const MODE: ValueMode = ValueMode::Numeric;

    fn from_cell(value: &CellValue) -> Option<Self> {
        value.as_number()
    }

    fn to_input(&self) -> String {
        self.to_string()
    }
}

impl CellElement for String {
    const MODE: ValueMode = ValueMode::Text;

    fn from_cell(value: &CellValue) -> Option<Self> {
        match value {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(n.to_string()),
        }
    }

    fn to_input(&self) -> String {
        self.clone()
    }
}
