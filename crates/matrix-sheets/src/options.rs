//! Session and read options

use matrix_sheets_core::CellCoord;

/// What numeric decoding does with a cell that does not parse as a number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseFailurePolicy {
    /// Leave the cell out of the numeric store (default)
    #[default]
    Drop,
    /// Store the raw text instead
    KeepAsText,
    /// Fail decoding with [`Error::UnparsableCell`](crate::Error::UnparsableCell)
    Error,
}

/// Options for a [`Session`](crate::Session)
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionOptions {
    /// Numeric decoding policy for unparsable cells
    pub parse_failure: ParseFailurePolicy,
    /// Row extent of sheets created on write (default: 1)
    pub new_sheet_rows: u32,
    /// Column extent of sheets created on write (default: 1)
    pub new_sheet_cols: u32,
    /// Patch the cached stores with written cells after a successful write
    /// (default: false, the next read reloads when the remote time advances)
    pub refresh_cache_after_write: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            parse_failure: ParseFailurePolicy::Drop,
            new_sheet_rows: 1,
            new_sheet_cols: 1,
            refresh_cache_after_write: false,
        }
    }
}

/// A rectangle read request
///
/// `rows` and `cols` are signed so that callers passing computed extents get
/// an empty result for negative values instead of a panic. A value of 0 means
/// "discover from the data".
///
/// ```
/// use matrix_sheets::ReadRequest;
///
/// let req = ReadRequest::at(2, 1).rows(3).cols(2).fill(0.0);
/// assert_eq!(req.rows, 3);
/// assert_eq!(req.fill, Some(0.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRequest<T> {
    /// Top-left cell of the read
    pub anchor: CellCoord,
    /// Number of rows, 0 to discover
    pub rows: i64,
    /// Number of columns, 0 to discover
    pub cols: i64,
    /// Value substituted for absent cells; enables exact-rectangle reads
    pub fill: Option<T>,
}

impl<T> ReadRequest<T> {
    /// Read anchored at `A1`
    pub fn new() -> Self {
        Self::from(CellCoord::ORIGIN)
    }

    /// Read anchored at (`row`, `col`)
    pub fn at(row: u32, col: u32) -> Self {
        Self::from(CellCoord::new(row, col))
    }

    pub fn rows(mut self, rows: i64) -> Self {
        self.rows = rows;
        self
    }

    pub fn cols(mut self, cols: i64) -> Self {
        self.cols = cols;
        self
    }

    pub fn fill(mut self, value: T) -> Self {
        self.fill = Some(value);
        self
    }
}

impl<T> Default for ReadRequest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<CellCoord> for ReadRequest<T> {
    fn from(anchor: CellCoord) -> Self {
        Self {
            anchor,
            rows: 0,
            cols: 0,
            fill: None,
        }
    }
}
