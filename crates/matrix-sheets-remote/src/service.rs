//! The collaborator interface consumed by the synchronization layer.

use crate::error::RemoteResult;
use crate::types::{CellQuery, CellRecord, CellUpdate, SheetDescriptor, SheetId, SpreadsheetKey};

/// A remote tabular data service.
///
/// Every call blocks until the service answers. Implementations own
/// authentication, transport and timeouts; errors are returned as
/// [`RemoteError`](crate::RemoteError) and never retried by callers.
pub trait SheetService {
    /// Resolve a spreadsheet by its title.
    fn find_spreadsheet(&mut self, name: &str) -> RemoteResult<Option<SpreadsheetKey>>;

    /// Enumerate every sheet of a spreadsheet.
    fn list_sheets(&mut self, spreadsheet: &SpreadsheetKey) -> RemoteResult<Vec<SheetDescriptor>>;

    /// Fetch the current descriptor of one sheet.
    fn sheet(&mut self, spreadsheet: &SpreadsheetKey, id: &SheetId) -> RemoteResult<SheetDescriptor>;

    /// Create a sheet with the given extents.
    fn create_sheet(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        name: &str,
        rows: u32,
        cols: u32,
    ) -> RemoteResult<SheetDescriptor>;

    /// Change the extents of a sheet.
    fn resize_sheet(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        id: &SheetId,
        rows: u32,
        cols: u32,
    ) -> RemoteResult<SheetDescriptor>;

    /// Delete a sheet.
    fn delete_sheet(&mut self, spreadsheet: &SpreadsheetKey, id: &SheetId) -> RemoteResult<()>;

    /// Enumerate cell records, row-major.
    ///
    /// Without a query only non-blank cells are returned. With a query the
    /// result is limited to its bounds and, if `include_empty` is set, holds
    /// one record per cell inside the bounds.
    fn fetch_cells(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        id: &SheetId,
        query: Option<&CellQuery>,
    ) -> RemoteResult<Vec<CellRecord>>;

    /// Apply a batch of cell updates as one operation.
    fn submit_cell_updates(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        id: &SheetId,
        updates: Vec<CellUpdate>,
    ) -> RemoteResult<()>;
}

impl<S: SheetService + ?Sized> SheetService for &mut S {
    fn find_spreadsheet(&mut self, name: &str) -> RemoteResult<Option<SpreadsheetKey>> {
        (**self).find_spreadsheet(name)
    }

    fn list_sheets(&mut self, spreadsheet: &SpreadsheetKey) -> RemoteResult<Vec<SheetDescriptor>> {
        (**self).list_sheets(spreadsheet)
    }

    fn sheet(&mut self, spreadsheet: &SpreadsheetKey, id: &SheetId) -> RemoteResult<SheetDescriptor> {
        (**self).sheet(spreadsheet, id)
    }

    fn create_sheet(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        name: &str,
        rows: u32,
        cols: u32,
    ) -> RemoteResult<SheetDescriptor> {
        (**self).create_sheet(spreadsheet, name, rows, cols)
    }

    fn resize_sheet(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        id: &SheetId,
        rows: u32,
        cols: u32,
    ) -> RemoteResult<SheetDescriptor> {
        (**self).resize_sheet(spreadsheet, id, rows, cols)
    }

    fn delete_sheet(&mut self, spreadsheet: &SpreadsheetKey, id: &SheetId) -> RemoteResult<()> {
        (**self).delete_sheet(spreadsheet, id)
    }

    fn fetch_cells(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        id: &SheetId,
        query: Option<&CellQuery>,
    ) -> RemoteResult<Vec<CellRecord>> {
        (**self).fetch_cells(spreadsheet, id, query)
    }

    fn submit_cell_updates(
        &mut self,
        spreadsheet: &SpreadsheetKey,
        id: &SheetId,
        updates: Vec<CellUpdate>,
    ) -> RemoteResult<()> {
        (**self).submit_cell_updates(spreadsheet, id, updates)
    }
}
