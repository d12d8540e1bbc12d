//! Values exchanged with a remote sheet service.

use std::fmt;

use matrix_sheets_core::CellRect;
use serde::{Deserialize, Serialize};

/// Opaque identifier of a spreadsheet document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpreadsheetKey(pub String);

impl SpreadsheetKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpreadsheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of one sheet inside a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SheetId(pub String);

impl SheetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remote metadata for one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetDescriptor {
    /// Sheet title, unique within its spreadsheet
    pub name: String,
    pub id: SheetId,
    /// Current row extent
    pub row_count: u32,
    /// Current column extent
    pub col_count: u32,
    /// Last-modified time as reported by the service (ISO-8601-like)
    pub updated: String,
}

/// Handle identifying a cell for a later update, obtained from a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellHandle(String);

impl CellHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One cell as enumerated by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    pub handle: CellHandle,
    /// 1-based row
    pub row: u32,
    /// 1-based column
    pub col: u32,
    /// Raw input value; empty for blank cells
    pub raw: String,
}

/// Inclusive bounds restricting a cell fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellQuery {
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
    /// Also return blank cells inside the bounds
    pub include_empty: bool,
}

impl CellQuery {
    /// Query covering exactly `rect`
    pub fn covering(rect: CellRect, include_empty: bool) -> Self {
        let end = rect.end();
        Self {
            min_row: rect.start.row,
            max_row: end.row,
            min_col: rect.start.col,
            max_col: end.col,
            include_empty,
        }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.min_row..=self.max_row).contains(&row) && (self.min_col..=self.max_col).contains(&col)
    }
}

/// New input value for a previously fetched cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellUpdate {
    pub handle: CellHandle,
    /// Textual input; empty clears the cell
    pub input: String,
}
