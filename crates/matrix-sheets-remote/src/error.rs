//! Error types for the remote service layer.

use thiserror::Error;

use crate::memory::CallKind;

/// Error surfaced by a [`SheetService`](crate::SheetService) implementation.
///
/// Callers propagate it without reinterpretation.
pub type RemoteError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Failure to parse a remote last-modified timestamp.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("timestamp '{0}' has fewer than six date/time fields")]
    TooFewFields(String),

    #[error("timestamp '{input}' has a non-numeric field '{field}'")]
    NonNumeric { input: String, field: String },

    #[error("timestamp '{0}' is not a valid calendar date/time")]
    OutOfRange(String),
}

/// Errors raised by [`MemoryService`](crate::MemoryService).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Unknown spreadsheet: {0}")]
    UnknownSpreadsheet(String),

    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    #[error("A sheet named '{0}' already exists")]
    DuplicateSheet(String),

    #[error("Invalid cell handle: {0}")]
    InvalidHandle(String),

    #[error("Cell R{row}C{col} is outside the {rows}x{cols} sheet")]
    OutOfBounds { row: u32, col: u32, rows: u32, cols: u32 },

    #[error("Sheet size must be at least 1x1, got {0}x{1}")]
    InvalidSize(u32, u32),

    #[error("Injected failure for {0:?}")]
    Injected(CallKind),
}
