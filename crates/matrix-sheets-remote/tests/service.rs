//! MemoryService behaving as a remote collaborator

use matrix_sheets_remote::{
    CallKind, CellQuery, CellUpdate, MemoryService, SheetService, SpreadsheetKey, Timestamp,
};
use pretty_assertions::assert_eq;

/// Generic code sees the same service through `&mut S`
fn sheet_names<S: SheetService>(mut service: S, key: &SpreadsheetKey) -> Vec<String> {
    service
        .list_sheets(key)
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect()
}

#[test]
fn test_borrowed_service() {
    let mut svc = MemoryService::new();
    let key = svc.create_spreadsheet("Book");
    svc.create_sheet(&key, "A", 1, 1).unwrap();
    svc.create_sheet(&key, "B", 1, 1).unwrap();

    assert_eq!(sheet_names(&mut svc, &key), vec!["A", "B"]);
    assert_eq!(svc.call_count(CallKind::ListSheets), 1);
}

#[test]
fn test_fetch_then_update() {
    let mut svc = MemoryService::new();
    let key = svc.create_spreadsheet("Book");
    let desc = svc.create_sheet(&key, "Data", 2, 2).unwrap();
    let before = Timestamp::parse(&desc.updated).unwrap();

    let query = CellQuery {
        min_row: 1,
        max_row: 2,
        min_col: 1,
        max_col: 2,
        include_empty: true,
    };
    let records = svc.fetch_cells(&key, &desc.id, Some(&query)).unwrap();
    assert_eq!(records.len(), 4);

    let updates = records
        .iter()
        .map(|r| CellUpdate {
            handle: r.handle.clone(),
            input: format!("{}", r.row * 10 + r.col),
        })
        .collect();
    svc.submit_cell_updates(&key, &desc.id, updates).unwrap();

    let after = Timestamp::parse(&svc.sheet(&key, &desc.id).unwrap().updated).unwrap();
    assert!(after > before);
    assert_eq!(svc.cell(&key, "Data", 2, 1), Some("21"));

    let sparse = svc.fetch_cells(&key, &desc.id, None).unwrap();
    let raws: Vec<_> = sparse.iter().map(|r| r.raw.as_str()).collect();
    assert_eq!(raws, vec!["11", "12", "21", "22"]);
}

#[test]
fn test_book_survives_json() {
    let mut svc = MemoryService::new();
    let key = svc.create_spreadsheet("Book");
    svc.create_sheet(&key, "Data", 2, 2).unwrap();
    svc.set_cell(&key, "Data", 1, 2, "x").unwrap();

    let json = serde_json::to_string(&svc).unwrap();
    let mut restored: MemoryService = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.cell(&key, "Data", 1, 2), Some("x"));
    assert!(restored.calls().is_empty());

    // Ids keep counting from where they left off
    let next = restored.create_spreadsheet("Other");
    assert_ne!(next, key);
}
