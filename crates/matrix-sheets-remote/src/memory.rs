//! In-process [`SheetService`] implementation.
//!
//! `MemoryService` behaves like a small remote service: sheets have fixed
//! extents that must be grown before writing past them, every mutation
//! advances a per-sheet last-modified timestamp, and cells are addressed
//! through handles returned by a previous fetch. Time comes from a logical
//! clock that advances one second per mutation, so behavior is deterministic.
//!
//! The service can be serialized with serde, which is how the `msheet` CLI
//! keeps a "book" on disk between invocations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MemoryError, RemoteResult};
use crate::service::SheetService;
use crate::timestamp::Timestamp;
use crate::types::{
    CellHandle, CellQuery, CellRecord, CellUpdate, SheetDescriptor, SheetId, SpreadsheetKey,
};

/// 2012-05-08T14:30:41.000Z
const CLOCK_START_MS: i64 = 1_336_487_441_000;
const CLOCK_TICK_MS: i64 = 1_000;

/// The kind of a [`SheetService`] call, for call accounting in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallKind {
    FindSpreadsheet,
    ListSheets,
    Sheet,
    CreateSheet,
    ResizeSheet,
    DeleteSheet,
    FetchCells,
    SubmitCellUpdates,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MemorySheet {
    id: String,
    name: String,
    rows: u32,
    cols: u32,
    updated: i64,
    /// row -> col -> raw input
    cells: BTreeMap<u32, BTreeMap<u32, String>>,
}

impl MemorySheet {
    fn descriptor(&self) -> SheetDescriptor {
        SheetDescriptor {
            name: self.name.clone(),
            id: SheetId::new(self.id.clone()),
            row_count: self.rows,
            col_count: self.cols,
            updated: Timestamp::from_millis(self.updated).to_remote_string(),
        }
    }

    fn handle(&self, row: u32, col: u32) -> CellHandle {
        CellHandle::new(format!("{}/R{row}C{col}", self.id))
    }

    fn parse_handle(&self, handle: &CellHandle) -> Result<(u32, u32), MemoryError> {
        let invalid = || MemoryError::InvalidHandle(handle.as_str().to_string());
        let rest = handle
            .as_str()
            .strip_prefix(self.id.as_str())
            .and_then(|s| s.strip_prefix("/R"))
            .ok_or_else(invalid)?;
        let (row, col) = rest.split_once('C').ok_or_else(invalid)?;
        let row = row.parse().map_err(|_| invalid())?;
        let col = col.parse().map_err(|_| invalid())?;
        Ok((row, col))
    }

    fn check_bounds(&self, row: u32, col: u32) -> Result<(), MemoryError> {
        if row == 0 || col == 0 || row > self.rows || col > self.cols {
            return Err(MemoryError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    fn put(&mut self, row: u32, col: u32, raw: String) {
        if raw.is_empty() {
            if let Some(cols) = self.cells.get_mut(&row) {
                cols.remove(&col);
                if cols.is_empty() {
                    self.cells.remove(&row);
                }
            }
        } else {
            self.cells.entry(row).or_default().insert(col, raw);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MemorySpreadsheet {
    name: String,
    sheets: Vec<MemorySheet>,
}

/// An in-memory spreadsheet service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryService {
    spreadsheets: BTreeMap<String, MemorySpreadsheet>,
    clock: i64,
    next_id: u64,
    #[serde(skip)]
    calls: Vec<CallKind>,
    #[serde(skip)]
    fail_next: Vec<CallKind>,
}

impl Default for MemoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryService {
    pub fn new() -> Self {
        Self {
            spreadsheets: BTreeMap::new(),
            clock: CLOCK_START_MS,
            next_id: 1,
            calls: Vec::new(),
            fail_next: Vec::new(),
        }
    }

    /// Create an empty spreadsheet and return its key.
    pub fn create_spreadsheet(&mut self, name: &str) -> SpreadsheetKey {
        let key = format!("key{}", self.next_id);
        self.next_id += 1;
        self.spreadsheets.insert(
            key.clone(),
            MemorySpreadsheet {
                name: name.to_string(),
                sheets: Vec::new(),
            },
        );
        tracing::debug!("Created spreadsheet '{name}' with key {key}");
        SpreadsheetKey(key)
    }

    /// All spreadsheets as `(key, name)` pairs.
    pub fn spreadsheets(&self) -> Vec<(SpreadsheetKey, String)> {
        self.spreadsheets
            .iter()
            .map(|(k, s)| (SpreadsheetKey(k.clone()), s.name.clone()))
            .collect()
    }

    /// Edit a cell directly, as another user of the service would.
    ///
    /// Advances the sheet's last-modified time. An empty `raw` clears the cell.
    pub fn set_cell(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        sheet_name: &str,
        row: u32,
        col: u32,
        raw: &str,
    ) -> Result<(), MemoryError> {
        let now = self.tick();
        let sheet = self.sheet_by_name_mut(spreadsheet, sheet_name)?;
        sheet.check_bounds(row, col)?;
        sheet.put(row, col, raw.to_string());
        sheet.updated = now;
        Ok(())
    }

    /// Read the raw input of a cell directly.
    pub fn cell(&self, spreadsheet: &SpreadsheetKey, sheet_name: &str, row: u32, col: u32) -> Option<&str> {
        self.spreadsheets
            .get(spreadsheet.as_str())?
            .sheets
            .iter()
            .find(|s| s.name == sheet_name)?
            .cells
            .get(&row)?
            .get(&col)
            .map(String::as_str)
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> &[CallKind] {
        &self.calls
    }

    /// Number of calls of one kind made so far.
    pub fn call_count(&self, kind: CallKind) -> usize {
        self.calls.iter().filter(|&&c| c == kind).count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Make the next call of `kind` fail with [`MemoryError::Injected`].
    pub fn fail_next(&mut self, kind: CallKind) {
        self.fail_next.push(kind);
    }

    fn record(&mut self, kind: CallKind) -> Result<(), MemoryError> {
        self.calls.push(kind);
        if let Some(pos) = self.fail_next.iter().position(|&k| k == kind) {
            self.fail_next.remove(pos);
            return Err(MemoryError::Injected(kind));
        }
        Ok(())
    }

    fn tick(&mut self) -> i64 {
        self.clock += CLOCK_TICK_MS;
        self.clock
    }

    fn spreadsheet(&self, key: &SpreadsheetKey) -> Result<&MemorySpreadsheet, MemoryError> {
        self.spreadsheets
            .get(key.as_str())
            .ok_or_else(|| MemoryError::UnknownSpreadsheet(key.to_string()))
    }

    fn spreadsheet_mut(&mut self, key: &SpreadsheetKey) -> Result<&mut MemorySpreadsheet, MemoryError> {
        self.spreadsheets
            .get_mut(key.as_str())
            .ok_or_else(|| MemoryError::UnknownSpreadsheet(key.to_string()))
    }

    fn sheet_ref(&self, key: &SpreadsheetKey, id: &SheetId) -> Result<&MemorySheet, MemoryError> {
        self.spreadsheet(key)?
            .sheets
            .iter()
            .find(|s| s.id == id.as_str())
            .ok_or_else(|| MemoryError::UnknownSheet(id.to_string()))
    }

    fn sheet_mut(&mut self, key: &SpreadsheetKey, id: &SheetId) -> Result<&mut MemorySheet, MemoryError> {
        self.spreadsheet_mut(key)?
            .sheets
            .iter_mut()
            .find(|s| s.id == id.as_str())
            .ok_or_else(|| MemoryError::UnknownSheet(id.to_string()))
    }

    fn sheet_by_name_mut(
        &mut self,
        key: &SpreadsheetKey,
        name: &str,
    ) -> Result<&mut MemorySheet, MemoryError> {
        self.spreadsheet_mut(key)?
            .sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| MemoryError::UnknownSheet(name.to_string()))
    }
}

impl SheetService for MemoryService {
    fn find_spreadsheet(&mut self, name: &str) -> RemoteResult<Option<SpreadsheetKey>> {
        self.record(CallKind::FindSpreadsheet)?;
        Ok(self
            .spreadsheets
            .iter()
            .find(|(_, s)| s.name == name)
            .map(|(k, _)| SpreadsheetKey(k.clone())))
    }

    fn list_sheets(&mut self, spreadsheet: &SpreadsheetKey) -> RemoteResult<Vec<SheetDescriptor>> {
        self.record(CallKind::ListSheets)?;
        Ok(self
            .spreadsheet(spreadsheet)?
            .sheets
            .iter()
            .map(MemorySheet::descriptor)
            .collect())
    }

    fn sheet(&mut self, spreadsheet: &SpreadsheetKey, id: &SheetId) -> RemoteResult<SheetDescriptor> {
        self.record(CallKind::Sheet)?;
        Ok(self.sheet_ref(spreadsheet, id)?.descriptor())
    }

    fn create_sheet(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        name: &str,
        rows: u32,
        cols: u32,
    ) -> RemoteResult<SheetDescriptor> {
        self.record(CallKind::CreateSheet)?;
        if rows == 0 || cols == 0 {
            return Err(MemoryError::InvalidSize(rows, cols).into());
        }
        if self.spreadsheet(spreadsheet)?.sheets.iter().any(|s| s.name == name) {
            return Err(MemoryError::DuplicateSheet(name.to_string()).into());
        }

        let id = format!("od{}", self.next_id);
        self.next_id += 1;
        let now = self.tick();
        let sheet = MemorySheet {
            id,
            name: name.to_string(),
            rows,
            cols,
            updated: now,
            cells: BTreeMap::new(),
        };
        let descriptor = sheet.descriptor();
        self.spreadsheet_mut(spreadsheet)?.sheets.push(sheet);
        Ok(descriptor)
    }

    fn resize_sheet(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        id: &SheetId,
        rows: u32,
        cols: u32,
    ) -> RemoteResult<SheetDescriptor> {
        self.record(CallKind::ResizeSheet)?;
        if rows == 0 || cols == 0 {
            return Err(MemoryError::InvalidSize(rows, cols).into());
        }
        let now = self.tick();
        let sheet = self.sheet_mut(spreadsheet, id)?;
        sheet.rows = rows;
        sheet.cols = cols;
        sheet.cells.retain(|&r, _| r <= rows);
        for row in sheet.cells.values_mut() {
            row.retain(|&c, _| c <= cols);
        }
        sheet.cells.retain(|_, row| !row.is_empty());
        sheet.updated = now;
        Ok(sheet.descriptor())
    }

    fn delete_sheet(&mut self, spreadsheet: &SpreadsheetKey, id: &SheetId) -> RemoteResult<()> {
        self.record(CallKind::DeleteSheet)?;
        let book = self.spreadsheet_mut(spreadsheet)?;
        let before = book.sheets.len();
        book.sheets.retain(|s| s.id != id.as_str());
        if book.sheets.len() == before {
            return Err(MemoryError::UnknownSheet(id.to_string()).into());
        }
        Ok(())
    }

    fn fetch_cells(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        id: &SheetId,
        query: Option<&CellQuery>,
    ) -> RemoteResult<Vec<CellRecord>> {
        self.record(CallKind::FetchCells)?;
        let sheet = self.sheet_ref(spreadsheet, id)?;

        let record = |row: u32, col: u32, raw: &str| CellRecord {
            handle: sheet.handle(row, col),
            row,
            col,
            raw: raw.to_string(),
        };

        let records = match query {
            Some(q) if q.min_row > q.max_row || q.min_col > q.max_col => Vec::new(),
            None => sheet
                .cells
                .iter()
                .flat_map(|(&r, cols)| cols.iter().map(move |(&c, raw)| (r, c, raw)))
                .map(|(r, c, raw)| record(r, c, raw))
                .collect(),
            Some(q) if q.include_empty => {
                let max_row = q.max_row.min(sheet.rows);
                let max_col = q.max_col.min(sheet.cols);
                let mut out = Vec::new();
                for r in q.min_row.max(1)..=max_row {
                    for c in q.min_col.max(1)..=max_col {
                        let raw = sheet
                            .cells
                            .get(&r)
                            .and_then(|cols| cols.get(&c))
                            .map_or("", String::as_str);
                        out.push(record(r, c, raw));
                    }
                }
                out
            }
            Some(q) => sheet
                .cells
                .range(q.min_row..=q.max_row)
                .flat_map(|(&r, cols)| {
                    cols.range(q.min_col..=q.max_col)
                        .map(move |(&c, raw)| (r, c, raw))
                })
                .map(|(r, c, raw)| record(r, c, raw))
                .collect(),
        };

        tracing::trace!("fetch_cells({id}) returned {} records", records.len());
        Ok(records)
    }

    fn submit_cell_updates(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        id: &SheetId,
        updates: Vec<CellUpdate>,
    ) -> RemoteResult<()> {
        self.record(CallKind::SubmitCellUpdates)?;
        let now = self.tick();
        let sheet = self.sheet_mut(spreadsheet, id)?;

        // Validate the whole batch before applying any of it
        let mut staged = Vec::with_capacity(updates.len());
        for update in updates {
            let (row, col) = sheet.parse_handle(&update.handle)?;
            sheet.check_bounds(row, col)?;
            staged.push((row, col, update.input));
        }

        for (row, col, input) in staged {
            sheet.put(row, col, input);
        }
        sheet.updated = now;
        Ok(())
    }
}
