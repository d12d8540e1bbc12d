//! Error types for matrix-sheets-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in matrix-sheets-core
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Invalid cell coordinate (zero row/column or bad A1 text)
    #[error("Invalid cell coordinate: {0}")]
    InvalidCoord(String),

    /// Input rows have different lengths
    #[error("Ragged input: row {row} has {found} values, expected {expected}")]
    RaggedRows {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// Flat data does not fit the requested shape
    #[error("Shape mismatch: {len} values cannot form a {rows}x{cols} matrix")]
    ShapeMismatch { len: usize, rows: usize, cols: usize },
}
