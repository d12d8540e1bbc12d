//! Sparse cell storage
//!
//! A [`CellStore`] holds the decoded contents of one sheet. Only cells that
//! carry a value are stored; an absent row or column means the cell is empty.
//! Lookups are by coordinate only and iteration order is unspecified.

use ahash::AHashMap;

use crate::value::CellValue;

/// Sparse row-based storage for one sheet's cells
///
/// Structure: `AHashMap<row, AHashMap<col, CellValue>>`, both 1-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellStore {
    rows: AHashMap<u32, AHashMap<u32, CellValue>>,
}

impl CellStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell value
    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Set a cell value, replacing any previous value
    pub fn set(&mut self, row: u32, col: u32, value: CellValue) {
        self.rows.entry(row).or_default().insert(col, value);
    }

    /// Remove a cell, dropping its row when it becomes empty
    pub fn remove(&mut self, row: u32, col: u32) -> Option<CellValue> {
        let row_map = self.rows.get_mut(&row)?;
        let removed = row_map.remove(&col);
        if row_map.is_empty() {
            self.rows.remove(&row);
        }
        removed
    }

    /// Check whether any cell in `row` is present
    pub fn has_row(&self, row: u32) -> bool {
        self.rows.contains_key(&row)
    }

    /// Check whether the cell at (`row`, `col`) is present
    pub fn has_cell(&self, row: u32, col: u32) -> bool {
        self.get(row, col).is_some()
    }

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Check if no cells are stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows holding at least one cell
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Remove all cells
    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Iterate over all cells in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &CellValue)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, v)| (row, col, v)))
    }
}

impl FromIterator<(u32, u32, CellValue)> for CellStore {
    fn from_iter<I: IntoIterator<Item = (u32, u32, CellValue)>>(iter: I) -> Self {
        let mut store = CellStore::new();
        for (row, col, value) in iter {
            store.set(row, col, value);
        }
        store
    }
}
