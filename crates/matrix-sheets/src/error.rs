//! Error types for matrix-sheets

use matrix_sheets_remote::{RemoteError, TimestampError};
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while synchronizing, reading or writing sheets
#[derive(Debug, Error)]
pub enum Error {
    /// Sheet name not found remotely and creation was not requested
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// No spreadsheet with this title
    #[error("Spreadsheet not found: {0}")]
    SpreadsheetNotFound(String),

    /// A row required by the read has no cells
    #[error("Row {row} not found")]
    RowNotFound { row: u32 },

    /// A row has fewer contiguous cells than requested
    #[error("Not enough columns in row {row}: found {found}, required {required}")]
    InsufficientColumns { row: u32, found: u32, required: u32 },

    /// A row has no cell at the anchor column
    #[error("Row {row} has no cells at the anchor column")]
    EmptyRow { row: u32 },

    /// A cell expected after shape discovery is absent
    #[error("Cell R{row}C{col} missing after shape discovery")]
    MissingCell { row: u32, col: u32 },

    /// The requested rectangle cannot be allocated
    #[error("Rectangle of {rows}x{cols} cells is too large to read")]
    TooLarge { rows: u32, cols: u32 },

    /// A text cell was read in numeric mode
    #[error("Cell R{row}C{col} is not numeric")]
    NotNumeric { row: u32, col: u32 },

    /// Numeric decoding failed under the `Error` parse policy
    #[error("Cell R{row}C{col} could not be parsed as a number: '{raw}'")]
    UnparsableCell { row: u32, col: u32, raw: String },

    /// The service returned a different set of cells than requested
    #[error("Cell feed mismatch: expected {expected} cells, got {actual}")]
    CellFeedMismatch { expected: usize, actual: usize },

    /// The service reported an unreadable last-modified time
    #[error("Invalid remote timestamp: {0}")]
    InvalidTimestamp(#[from] TimestampError),

    /// Core data-structure error (ragged input, bad coordinate)
    #[error(transparent)]
    Core(#[from] matrix_sheets_core::Error),

    /// Error returned by the remote service, unmodified
    #[error("Remote service error: {0}")]
    Remote(#[source] RemoteError),
}

impl From<RemoteError> for Error {
    fn from(err: RemoteError) -> Self {
        Error::Remote(err)
    }
}
