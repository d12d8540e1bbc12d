//! Rectangle writer
//!
//! Writes a [`Matrix`] to a remote sheet in one batch. The sheet is created
//! if needed and grown (never shrunk) when the rectangle extends past its
//! current extents. Cell handles are always fetched fresh for the target
//! rectangle; the read cache is never consulted.

use matrix_sheets_core::{CellCoord, CellElement, CellRect, Matrix};
use matrix_sheets_remote::{
    CellHandle, CellQuery, CellRecord, CellUpdate, SheetService, SpreadsheetKey, Timestamp,
};

use crate::error::{Error, Result};
use crate::registry::SheetRegistry;

/// What a write did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    /// Rectangle written, `None` for an empty matrix
    pub rect: Option<CellRect>,
    /// Whether the sheet had to be grown first
    pub resized: bool,
    /// Number of cell updates submitted
    pub cells: usize,
}

/// Write `matrix` to `sheet` with its top-left value at `anchor`.
pub fn write<S, T>(
    service: &mut S,
    registry: &mut SheetRegistry,
    spreadsheet: &SpreadsheetKey,
    matrix: &Matrix<T>,
    sheet: &str,
    anchor: CellCoord,
) -> Result<WriteSummary>
where
    S: SheetService,
    T: CellElement,
{
    let anchor = anchor.validated()?;
    let remote_id = registry
        .ensure_sheet(service, spreadsheet, sheet, true)?
        .remote_id()
        .clone();

    if matrix.is_empty() {
        tracing::debug!("Nothing to write to '{sheet}'");
        return Ok(WriteSummary {
            rect: None,
            resized: false,
            cells: 0,
        });
    }

    let rect = target_rect(anchor, matrix.rows(), matrix.cols())?;
    let end = rect.end();

    let mut descriptor = service.sheet(spreadsheet, &remote_id)?;
    let pre_write = Timestamp::parse(&descriptor.updated)?;
    let was_current = registry
        .entry(sheet)
        .and_then(|entry| entry.last_sync())
        .is_some_and(|synced| synced == pre_write);

    let resized = end.row > descriptor.row_count || end.col > descriptor.col_count;
    if resized {
        let rows = end.row.max(descriptor.row_count);
        let cols = end.col.max(descriptor.col_count);
        tracing::info!(
            "Resizing sheet '{sheet}' from {}x{} to {rows}x{cols}",
            descriptor.row_count,
            descriptor.col_count
        );
        descriptor = service.resize_sheet(spreadsheet, &remote_id, rows, cols)?;
    }

    let records = service.fetch_cells(
        spreadsheet,
        &remote_id,
        Some(&CellQuery::covering(rect, true)),
    )?;
    let handles = match_records(rect, records)?;

    let updates: Vec<CellUpdate> = handles
        .into_iter()
        .zip(matrix.iter())
        .map(|(handle, value)| CellUpdate {
            handle,
            input: value.to_input(),
        })
        .collect();
    let cells = updates.len();

    let refresh = registry.options().refresh_cache_after_write;
    let policy = registry.options().parse_failure;
    let written: Vec<(CellCoord, String)> = if refresh && was_current {
        rect.cells()
            .zip(updates.iter().map(|u| u.input.clone()))
            .collect()
    } else {
        Vec::new()
    };

    service.submit_cell_updates(spreadsheet, &remote_id, updates)?;
    tracing::info!("Wrote {cells} cells to '{sheet}' at {rect}");

    if refresh {
        descriptor = service.sheet(spreadsheet, &remote_id)?;
    }
    let post_write = if refresh {
        Some(Timestamp::parse(&descriptor.updated)?)
    } else {
        None
    };

    let entry = registry.entry_mut(sheet)?;
    entry.set_descriptor(descriptor);
    match post_write {
        Some(post) if was_current => {
            if entry.stores_mut().patch(&written, policy) {
                entry.mark_synced(post);
                tracing::debug!("Patched cached stores of '{sheet}' after write");
            } else {
                tracing::debug!("Cannot patch cached stores of '{sheet}', next read reloads");
            }
        }
        Some(_) => {
            tracing::debug!("Cache of '{sheet}' was already stale, leaving it for the next read");
        }
        None => {}
    }

    Ok(WriteSummary {
        rect: Some(rect),
        resized,
        cells,
    })
}

fn target_rect(anchor: CellCoord, rows: usize, cols: usize) -> Result<CellRect> {
    let too_large = || {
        matrix_sheets_core::Error::InvalidCoord(format!(
            "{rows}x{cols} values at {anchor} exceed the addressable range"
        ))
    };
    let rows = u32::try_from(rows).map_err(|_| too_large())?;
    let cols = u32::try_from(cols).map_err(|_| too_large())?;
    anchor.row.checked_add(rows - 1).ok_or_else(too_large)?;
    anchor.col.checked_add(cols - 1).ok_or_else(too_large)?;
    Ok(CellRect::new(anchor, rows, cols))
}

/// Order fetched handles row-major over `rect`, one per cell.
fn match_records(rect: CellRect, records: Vec<CellRecord>) -> Result<Vec<CellHandle>> {
    let expected = rect.cell_count();
    let actual = records.len();
    let mismatch = || Error::CellFeedMismatch { expected, actual };

    if actual != expected {
        return Err(mismatch());
    }

    let mut slots: Vec<Option<CellHandle>> = vec![None; expected];
    for record in records {
        let index = rect
            .index_of(CellCoord::new(record.row, record.col))
            .ok_or_else(mismatch)?;
        if slots[index].replace(record.handle).is_some() {
            return Err(mismatch());
        }
    }

    // Equal counts and no duplicates means every slot is filled.
    slots.into_iter().map(|s| s.ok_or_else(mismatch)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ParseFailurePolicy, SessionOptions};
    use matrix_sheets_core::{CellValue, ValueMode};
    use matrix_sheets_remote::{
        CallKind, MemoryService, RemoteResult, SheetDescriptor, SheetId,
    };
    use pretty_assertions::assert_eq;

    fn setup(options: SessionOptions) -> (MemoryService, SpreadsheetKey, SheetRegistry) {
        let mut svc = MemoryService::new();
        let key = svc.create_spreadsheet("Book");
        svc.create_sheet(&key, "Data", 5, 5).unwrap();
        let reg = SheetRegistry::discover(&mut svc, &key, options).unwrap();
        svc.clear_calls();
        (svc, key, reg)
    }

    fn column(n: usize) -> Matrix<f64> {
        Matrix::from_fn(n, 1, |r, _| r as f64)
    }

    #[test]
    fn test_resize_before_update() {
        let (mut svc, key, mut reg) = setup(SessionOptions::default());
        let summary = write(&mut svc, &mut reg, &key, &column(10), "Data", CellCoord::ORIGIN).unwrap();

        assert!(summary.resized);
        assert_eq!(summary.cells, 10);
        assert_eq!(svc.call_count(CallKind::ResizeSheet), 1);
        let resize = svc.calls().iter().position(|&c| c == CallKind::ResizeSheet);
        let submit = svc.calls().iter().position(|&c| c == CallKind::SubmitCellUpdates);
        assert!(resize < submit);

        let desc = reg.entry("Data").unwrap().descriptor();
        assert_eq!((desc.row_count, desc.col_count), (10, 5));
        assert_eq!(svc.cell(&key, "Data", 10, 1), Some("9"));
    }

    #[test]
    fn test_no_resize_when_it_fits() {
        let (mut svc, key, mut reg) = setup(SessionOptions::default());
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let summary = write(&mut svc, &mut reg, &key, &m, "Data", CellCoord::new(4, 4)).unwrap();

        assert!(!summary.resized);
        assert_eq!(summary.rect, Some(CellRect::new(CellCoord::new(4, 4), 2, 2)));
        assert_eq!(svc.call_count(CallKind::ResizeSheet), 0);
        assert_eq!(svc.call_count(CallKind::SubmitCellUpdates), 1);
        assert_eq!(svc.cell(&key, "Data", 5, 5), Some("4"));
    }

    #[test]
    fn test_never_shrinks() {
        let (mut svc, key, mut reg) = setup(SessionOptions::default());
        let m = Matrix::row_vector(vec![1.0; 7]);
        write(&mut svc, &mut reg, &key, &m, "Data", CellCoord::new(2, 1)).unwrap();
        let desc = reg.entry("Data").unwrap().descriptor();
        assert_eq!((desc.row_count, desc.col_count), (5, 7));
    }

    #[test]
    fn test_creates_missing_sheet() {
        let (mut svc, key, mut reg) = setup(SessionOptions::default());
        let m = Matrix::from_rows(vec![vec!["a".to_string(), "b".to_string()]]).unwrap();
        write(&mut svc, &mut reg, &key, &m, "New", CellCoord::ORIGIN).unwrap();

        assert_eq!(svc.call_count(CallKind::CreateSheet), 1);
        assert!(reg.contains("New"));
        assert_eq!(svc.cell(&key, "New", 1, 2), Some("b"));
    }

    #[test]
    fn test_empty_matrix_only_ensures_sheet() {
        let (mut svc, key, mut reg) = setup(SessionOptions::default());
        let summary =
            write(&mut svc, &mut reg, &key, &Matrix::<f64>::empty(), "New", CellCoord::ORIGIN).unwrap();

        assert_eq!(summary.rect, None);
        assert_eq!(svc.calls(), &[CallKind::ListSheets, CallKind::CreateSheet]);
    }

    #[test]
    fn test_invalid_anchor() {
        let (mut svc, key, mut reg) = setup(SessionOptions::default());
        let err = write(&mut svc, &mut reg, &key, &column(1), "Data", CellCoord::new(0, 1)).unwrap_err();
        assert!(matches!(err, Error::Core(_)));
        assert!(svc.calls().is_empty());
    }

    #[test]
    fn test_remote_error_propagates() {
        let (mut svc, key, mut reg) = setup(SessionOptions::default());
        svc.fail_next(CallKind::SubmitCellUpdates);
        let err = write(&mut svc, &mut reg, &key, &column(2), "Data", CellCoord::ORIGIN).unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
        assert_eq!(svc.cell(&key, "Data", 1, 1), None);
    }

    /// Drops the last record of every ranged fetch
    struct ShortFeed(MemoryService);

    impl SheetService for ShortFeed {
        fn find_spreadsheet(&mut self, name: &str) -> RemoteResult<Option<SpreadsheetKey>> {
            self.0.find_spreadsheet(name)
        }

        fn list_sheets(&mut self, key: &SpreadsheetKey) -> RemoteResult<Vec<SheetDescriptor>> {
            self.0.list_sheets(key)
        }

        fn sheet(&mut self, key: &SpreadsheetKey, id: &SheetId) -> RemoteResult<SheetDescriptor> {
            self.0.sheet(key, id)
        }

        fn create_sheet(
            &mut self,
            key: &SpreadsheetKey,
            name: &str,
            rows: u32,
            cols: u32,
        ) -> RemoteResult<SheetDescriptor> {
            self.0.create_sheet(key, name, rows, cols)
        }

        fn resize_sheet(
            &mut self,
            key: &SpreadsheetKey,
            id: &SheetId,
            rows: u32,
            cols: u32,
        ) -> RemoteResult<SheetDescriptor> {
            self.0.resize_sheet(key, id, rows, cols)
        }

        fn delete_sheet(&mut self, key: &SpreadsheetKey, id: &SheetId) -> RemoteResult<()> {
            self.0.delete_sheet(key, id)
        }

        fn fetch_cells(
            &mut self,
            key: &SpreadsheetKey,
            id: &SheetId,
            query: Option<&CellQuery>,
        ) -> RemoteResult<Vec<CellRecord>> {
            let mut records = self.0.fetch_cells(key, id, query)?;
            if query.is_some() {
                records.pop();
            }
            Ok(records)
        }

        fn submit_cell_updates(
            &mut self,
            key: &SpreadsheetKey,
            id: &SheetId,
            updates: Vec<CellUpdate>,
        ) -> RemoteResult<()> {
            self.0.submit_cell_updates(key, id, updates)
        }
    }

    #[test]
    fn test_feed_mismatch_submits_nothing() {
        let (svc, key, mut reg) = setup(SessionOptions::default());
        let mut svc = ShortFeed(svc);
        let err = write(&mut svc, &mut reg, &key, &column(3), "Data", CellCoord::ORIGIN).unwrap_err();
        assert!(matches!(
            err,
            Error::CellFeedMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(svc.0.call_count(CallKind::SubmitCellUpdates), 0);
    }

    #[test]
    fn test_match_records_rejects_outside_and_duplicates() {
        let rect = CellRect::new(CellCoord::ORIGIN, 1, 2);
        let rec = |row, col| CellRecord {
            handle: CellHandle::new(format!("R{row}C{col}")),
            row,
            col,
            raw: String::new(),
        };

        let ok = match_records(rect, vec![rec(1, 2), rec(1, 1)]).unwrap();
        assert_eq!(ok, vec![CellHandle::new("R1C1"), CellHandle::new("R1C2")]);

        assert!(matches!(
            match_records(rect, vec![rec(1, 1), rec(2, 1)]),
            Err(Error::CellFeedMismatch { .. })
        ));
        assert!(matches!(
            match_records(rect, vec![rec(1, 1), rec(1, 1)]),
            Err(Error::CellFeedMismatch { .. })
        ));
    }

    #[test]
    fn test_write_leaves_cache_by_default() {
        let (mut svc, key, mut reg) = setup(SessionOptions::default());
        reg.sync(&mut svc, &key, "Data").unwrap();
        let synced = reg.entry("Data").unwrap().last_sync();

        write(&mut svc, &mut reg, &key, &column(2), "Data", CellCoord::ORIGIN).unwrap();
        let entry = reg.entry("Data").unwrap();
        assert_eq!(entry.last_sync(), synced);
        assert!(entry.store(ValueMode::Numeric).unwrap().is_empty());
    }

    #[test]
    fn test_write_through_refresh() {
        let options = SessionOptions {
            refresh_cache_after_write: true,
            ..SessionOptions::default()
        };
        let (mut svc, key, mut reg) = setup(options);
        reg.sync(&mut svc, &key, "Data").unwrap();

        let m = Matrix::row_vector(vec![1.5, 2.5]);
        write(&mut svc, &mut reg, &key, &m, "Data", CellCoord::ORIGIN).unwrap();
        svc.clear_calls();

        let store = reg
            .get_store(&mut svc, &key, "Data", ValueMode::Numeric)
            .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(svc.call_count(CallKind::FetchCells), 0);
    }

    #[test]
    fn test_write_through_skips_stale_entry() {
        let options = SessionOptions {
            refresh_cache_after_write: true,
            ..SessionOptions::default()
        };
        let (mut svc, key, mut reg) = setup(options);
        reg.sync(&mut svc, &key, "Data").unwrap();
        svc.set_cell(&key, "Data", 3, 3, "9").unwrap();

        write(&mut svc, &mut reg, &key, &column(1), "Data", CellCoord::ORIGIN).unwrap();
        svc.clear_calls();

        let store = reg
            .get_store(&mut svc, &key, "Data", ValueMode::Numeric)
            .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(svc.call_count(CallKind::FetchCells), 1);
    }

    #[test]
    fn test_write_through_keeps_text() {
        let options = SessionOptions {
            refresh_cache_after_write: true,
            parse_failure: ParseFailurePolicy::KeepAsText,
            ..SessionOptions::default()
        };
        let (mut svc, key, mut reg) = setup(options);
        reg.sync(&mut svc, &key, "Data").unwrap();

        let m = Matrix::row_vector(vec!["1".to_string(), "x".to_string()]);
        write(&mut svc, &mut reg, &key, &m, "Data", CellCoord::ORIGIN).unwrap();
        svc.clear_calls();

        let numeric = reg
            .get_store(&mut svc, &key, "Data", ValueMode::Numeric)
            .unwrap();
        assert_eq!(numeric.get(1, 1), Some(&CellValue::Number(1.0)));
        assert_eq!(numeric.get(1, 2), Some(&CellValue::text("x")));
        assert_eq!(svc.call_count(CallKind::FetchCells), 0);

        let patched = reg.entry("Data").unwrap().stores().clone();
        reg.invalidate("Data");
        reg.sync(&mut svc, &key, "Data").unwrap();
        assert_eq!(reg.entry("Data").unwrap().stores(), &patched);
    }

    #[test]
    fn test_write_through_unparsable_under_error_policy() {
        let options = SessionOptions {
            refresh_cache_after_write: true,
            parse_failure: ParseFailurePolicy::Error,
            ..SessionOptions::default()
        };
        let (mut svc, key, mut reg) = setup(options);
        reg.sync(&mut svc, &key, "Data").unwrap();
        let synced = reg.entry("Data").unwrap().last_sync();

        let m = Matrix::row_vector(vec!["x".to_string()]);
        write(&mut svc, &mut reg, &key, &m, "Data", CellCoord::new(1, 2)).unwrap();
        assert_eq!(reg.entry("Data").unwrap().last_sync(), synced);
        svc.clear_calls();

        let err = reg
            .get_store(&mut svc, &key, "Data", ValueMode::Numeric)
            .unwrap_err();
        assert!(matches!(err, Error::UnparsableCell { row: 1, col: 2, ref raw } if raw == "x"));
        assert_eq!(svc.call_count(CallKind::FetchCells), 1);

        let text = reg.entry("Data").unwrap().store(ValueMode::Text).unwrap();
        assert_eq!(text.get(1, 2), Some(&CellValue::text("x")));
    }
}
