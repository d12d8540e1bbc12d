//! Prelude module - common imports for matrix-sheets users
//!
//! ```rust
//! use matrix_sheets::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellCoord,
    CellValue,
    // Errors
    Error,
    Matrix,
    // Collaborators
    MemoryService,
    ParseFailurePolicy,
    ReadRequest,
    Result,
    Session,
    SessionOptions,
    SheetService,
    SpreadsheetKey,
};
