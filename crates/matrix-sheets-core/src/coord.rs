//! Cell coordinate and rectangle types
//!
//! Coordinates are 1-based on both axes, matching the addressing used by the
//! remote sheet service. Row 1, column 1 is the top-left cell (`A1`). There is
//! no 0-based form anywhere in the crate.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A 1-based (row, column) cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellCoord {
    /// Row number, starting at 1
    pub row: u32,
    /// Column number, starting at 1 (A = 1)
    pub col: u32,
}

impl CellCoord {
    /// The top-left cell, `A1`
    pub const ORIGIN: CellCoord = CellCoord { row: 1, col: 1 };

    /// Create a coordinate without validation
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Create a coordinate, rejecting row or column 0
    pub fn try_new(row: u32, col: u32) -> Result<Self> {
        Self::new(row, col).validated()
    }

    /// Return `self` if both components are at least 1
    pub fn validated(self) -> Result<Self> {
        if self.row == 0 || self.col == 0 {
            return Err(Error::InvalidCoord(format!(
                "({}, {}) is not 1-based",
                self.row, self.col
            )));
        }
        Ok(self)
    }

    /// Parse a coordinate from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use matrix_sheets_core::CellCoord;
    ///
    /// let c = CellCoord::parse("A1").unwrap();
    /// assert_eq!(c, CellCoord::new(1, 1));
    ///
    /// let c = CellCoord::parse("ab12").unwrap();
    /// assert_eq!(c, CellCoord::new(12, 28));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidCoord("empty address".into()));
        }

        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(s.len());
        let (letters, digits) = s.split_at(split);

        if letters.is_empty() {
            return Err(Error::InvalidCoord(format!("no column letters in '{s}'")));
        }
        if digits.is_empty() {
            return Err(Error::InvalidCoord(format!("no row number in '{s}'")));
        }

        let col = Self::letters_to_column(letters)?;
        let row: u32 = digits
            .parse()
            .map_err(|_| Error::InvalidCoord(format!("invalid row number in '{s}'")))?;

        Self::try_new(row, col)
    }

    /// Convert a 1-based column number to letters (1 = A, 26 = Z, 27 = AA)
    pub fn column_to_letters(col: u32) -> String {
        let mut result = String::new();
        let mut n = col;

        while n > 0 {
            n -= 1;
            result.insert(0, ((n % 26) as u8 + b'A') as char);
            n /= 26;
        }

        result
    }

    /// Convert column letters to a 1-based column number (A = 1)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidCoord("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidCoord(format!("invalid column letter '{c}'")));
            }
            col = col
                .checked_mul(26)
                .and_then(|n| n.checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1))
                .ok_or_else(|| Error::InvalidCoord(format!("column '{letters}' too large")))?;
        }

        Ok(col)
    }

    /// Format as an A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row)
    }

    /// Offset this coordinate by a number of rows and columns, saturating at
    /// `u32::MAX`
    pub fn offset(&self, rows: u32, cols: u32) -> CellCoord {
        CellCoord::new(self.row.saturating_add(rows), self.col.saturating_add(cols))
    }
}

impl Default for CellCoord {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl From<(u32, u32)> for CellCoord {
    fn from((row, col): (u32, u32)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellCoord {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A non-empty rectangle of cells anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    /// Top-left cell
    pub start: CellCoord,
    /// Number of rows (at least 1)
    pub rows: u32,
    /// Number of columns (at least 1)
    pub cols: u32,
}

impl CellRect {
    /// Create a rectangle of `rows` x `cols` cells starting at `start`
    pub fn new(start: CellCoord, rows: u32, cols: u32) -> Self {
        Self { start, rows, cols }
    }

    /// Bottom-right cell (inclusive)
    pub fn end(&self) -> CellCoord {
        self.start
            .offset(self.rows.saturating_sub(1), self.cols.saturating_sub(1))
    }

    /// Check whether a coordinate lies inside the rectangle
    pub fn contains(&self, coord: CellCoord) -> bool {
        let end = self.end();
        coord.row >= self.start.row
            && coord.row <= end.row
            && coord.col >= self.start.col
            && coord.col <= end.col
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Row-major offset of `coord` within the rectangle
    pub fn index_of(&self, coord: CellCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let r = (coord.row - self.start.row) as usize;
        let c = (coord.col - self.start.col) as usize;
        Some(r * self.cols as usize + c)
    }

    /// Iterate over all coordinates in row-major order
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.rows).flat_map(move |r| (0..self.cols).map(move |c| self.start.offset(r, c)))
    }
}

impl fmt::Display for CellRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end())
    }
}
