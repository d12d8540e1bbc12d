//! Cell-feed decoding
//!
//! Turns the cell records enumerated by a [`SheetService`] into
//! [`CellStore`]s. Text decoding keeps every raw value; numeric decoding
//! parses each value as `f64` and applies a [`ParseFailurePolicy`] to cells
//! that do not parse.
//!
//! [`SheetService`]: matrix_sheets_remote::SheetService

use matrix_sheets_core::{CellCoord, CellStore, CellValue, ValueMode};
use matrix_sheets_remote::CellRecord;

use crate::error::{Error, Result};
use crate::options::ParseFailurePolicy;

/// A cell that numeric decoding rejected under [`ParseFailurePolicy::Error`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub row: u32,
    pub col: u32,
    pub raw: String,
}

impl From<ParseFailure> for Error {
    fn from(failure: ParseFailure) -> Self {
        Error::UnparsableCell {
            row: failure.row,
            col: failure.col,
            raw: failure.raw,
        }
    }
}

/// Decode records with a custom constructor.
///
/// A constructor error is handled according to `policy`.
pub fn decode_with<F, E>(
    records: &[CellRecord],
    mut constructor: F,
    policy: ParseFailurePolicy,
) -> std::result::Result<CellStore, ParseFailure>
where
    F: FnMut(&str) -> std::result::Result<CellValue, E>,
{
    let mut store = CellStore::new();
    for record in records {
        match constructor(&record.raw) {
            Ok(value) => store.set(record.row, record.col, value),
            Err(_) => match policy {
                ParseFailurePolicy::Drop => {}
                ParseFailurePolicy::KeepAsText => {
                    store.set(record.row, record.col, CellValue::text(record.raw.as_str()))
                }
                ParseFailurePolicy::Error => {
                    return Err(ParseFailure {
                        row: record.row,
                        col: record.col,
                        raw: record.raw.clone(),
                    })
                }
            },
        }
    }
    Ok(store)
}

/// Decode keeping every raw value as text.
pub fn decode_text(records: &[CellRecord]) -> CellStore {
    records
        .iter()
        .map(|r| (r.row, r.col, CellValue::text(r.raw.as_str())))
        .collect()
}

/// Decode parsing every raw value as a number.
pub fn decode_numeric(
    records: &[CellRecord],
    policy: ParseFailurePolicy,
) -> std::result::Result<CellStore, ParseFailure> {
    decode_with(
        records,
        |raw| parse_number(raw).map(CellValue::Number),
        policy,
    )
}

/// Parse remote cell input as a number, ignoring surrounding whitespace.
pub fn parse_number(raw: &str) -> std::result::Result<f64, std::num::ParseFloatError> {
    raw.trim().parse()
}

/// Both decodings of one cell feed
///
/// The text decoding always succeeds. A numeric decoding that failed under
/// [`ParseFailurePolicy::Error`] is kept as its failure and reported only to
/// numeric reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetStores {
    text: CellStore,
    numeric: std::result::Result<CellStore, ParseFailure>,
}

impl Default for SheetStores {
    fn default() -> Self {
        Self {
            text: CellStore::new(),
            numeric: Ok(CellStore::new()),
        }
    }
}

impl SheetStores {
    /// Decode a feed both ways.
    pub fn decode(records: &[CellRecord], policy: ParseFailurePolicy) -> Self {
        Self {
            text: decode_text(records),
            numeric: decode_numeric(records, policy),
        }
    }

    pub fn text(&self) -> &CellStore {
        &self.text
    }

    /// The numeric decoding, or the cell that made it fail
    pub fn numeric(&self) -> Result<&CellStore> {
        self.numeric.as_ref().map_err(|failure| failure.clone().into())
    }

    /// The store for a read mode
    pub fn get(&self, mode: ValueMode) -> Result<&CellStore> {
        match mode {
            ValueMode::Numeric => self.numeric(),
            ValueMode::Text => Ok(&self.text),
        }
    }

    /// Record written values in both stores, as a reload would decode them.
    ///
    /// Returns false without changing anything when the result would differ
    /// from a reload: the numeric decoding already failed, or `policy` is
    /// `Error` and a written value is not a number.
    pub(crate) fn patch(&mut self, cells: &[(CellCoord, String)], policy: ParseFailurePolicy) -> bool {
        let Ok(numeric) = self.numeric.as_mut() else {
            return false;
        };
        if policy == ParseFailurePolicy::Error
            && cells
                .iter()
                .any(|(_, input)| !input.is_empty() && parse_number(input).is_err())
        {
            return false;
        }

        for (coord, input) in cells {
            let (row, col) = (coord.row, coord.col);
            if input.is_empty() {
                self.text.remove(row, col);
                numeric.remove(row, col);
                continue;
            }
            self.text.set(row, col, CellValue::text(input.as_str()));
            match parse_number(input) {
                Ok(n) => numeric.set(row, col, CellValue::Number(n)),
                Err(_) if policy == ParseFailurePolicy::KeepAsText => {
                    numeric.set(row, col, CellValue::text(input.as_str()))
                }
                Err(_) => {
                    numeric.remove(row, col);
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix_sheets_remote::CellHandle;
    use pretty_assertions::assert_eq;

    fn rec(row: u32, col: u32, raw: &str) -> CellRecord {
        CellRecord {
            handle: CellHandle::new(format!("R{row}C{col}")),
            row,
            col,
            raw: raw.to_string(),
        }
    }

    fn feed() -> Vec<CellRecord> {
        vec![
            rec(1, 1, "1.5"),
            rec(1, 2, " 2 "),
            rec(1, 3, "abc"),
            rec(2, 1, "-3e2"),
        ]
    }

    #[test]
    fn test_text_keeps_everything() {
        let store = decode_text(&feed());
        assert_eq!(store.len(), 4);
        assert_eq!(store.get(1, 3), Some(&CellValue::text("abc")));
        assert_eq!(store.get(1, 2), Some(&CellValue::text(" 2 ")));
    }

    #[test]
    fn test_numeric_drop() {
        let store = decode_numeric(&feed(), ParseFailurePolicy::Drop).unwrap();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(1, 1), Some(&CellValue::Number(1.5)));
        assert_eq!(store.get(1, 2), Some(&CellValue::Number(2.0)));
        assert_eq!(store.get(2, 1), Some(&CellValue::Number(-300.0)));
        assert!(!store.has_cell(1, 3));
    }

    #[test]
    fn test_numeric_keep_as_text() {
        let store = decode_numeric(&feed(), ParseFailurePolicy::KeepAsText).unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.get(1, 3), Some(&CellValue::text("abc")));
    }

    #[test]
    fn test_numeric_error() {
        let err = decode_numeric(&feed(), ParseFailurePolicy::Error).unwrap_err();
        assert_eq!(
            err,
            ParseFailure {
                row: 1,
                col: 3,
                raw: "abc".to_string()
            }
        );
        assert!(matches!(
            Error::from(err),
            Error::UnparsableCell { row: 1, col: 3, ref raw } if raw == "abc"
        ));
    }

    #[test]
    fn test_decode_is_idempotent() {
        let records = feed();
        let a = SheetStores::decode(&records, ParseFailurePolicy::Drop);
        let b = SheetStores::decode(&records, ParseFailurePolicy::Drop);
        assert_eq!(a, b);
    }

    #[test]
    fn test_error_policy_keeps_text() {
        let stores = SheetStores::decode(&feed(), ParseFailurePolicy::Error);
        let text = stores.get(ValueMode::Text).unwrap();
        assert_eq!(text.len(), 4);
        assert_eq!(text.get(1, 3), Some(&CellValue::text("abc")));
        assert!(matches!(
            stores.get(ValueMode::Numeric),
            Err(Error::UnparsableCell { row: 1, col: 3, .. })
        ));
    }

    #[test]
    fn test_custom_constructor() {
        let store = decode_with(
            &feed(),
            |raw| {
                if raw.starts_with('a') {
                    Ok(CellValue::text(raw.to_uppercase()))
                } else {
                    Err(())
                }
            },
            ParseFailurePolicy::Drop,
        )
        .unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1, 3), Some(&CellValue::text("ABC")));
    }

    fn cells(values: &[(u32, u32, &str)]) -> Vec<(CellCoord, String)> {
        values
            .iter()
            .map(|&(row, col, input)| (CellCoord::new(row, col), input.to_string()))
            .collect()
    }

    #[test]
    fn test_patch_updates_both_stores() {
        let mut stores = SheetStores::decode(&feed(), ParseFailurePolicy::Drop);
        let written = cells(&[(1, 1, "x"), (1, 3, "7"), (2, 1, "")]);
        assert!(stores.patch(&written, ParseFailurePolicy::Drop));

        assert_eq!(stores.text().get(1, 1), Some(&CellValue::text("x")));
        let numeric = stores.numeric().unwrap();
        assert!(!numeric.has_cell(1, 1));
        assert_eq!(numeric.get(1, 3), Some(&CellValue::Number(7.0)));
        assert!(!stores.text().has_row(2));
        assert!(!numeric.has_row(2));
    }

    #[test]
    fn test_patch_matches_reload() {
        for policy in [ParseFailurePolicy::Drop, ParseFailurePolicy::KeepAsText] {
            let mut stores = SheetStores::decode(&feed(), policy);
            assert!(stores.patch(&cells(&[(1, 1, "x"), (1, 2, "")]), policy));

            let reloaded = SheetStores::decode(
                &[rec(1, 1, "x"), rec(1, 3, "abc"), rec(2, 1, "-3e2")],
                policy,
            );
            assert_eq!(stores, reloaded);
        }
    }

    #[test]
    fn test_patch_refuses_unparsable_under_error_policy() {
        let records = vec![rec(1, 1, "1")];
        let mut stores = SheetStores::decode(&records, ParseFailurePolicy::Error);
        let before = stores.clone();

        assert!(!stores.patch(&cells(&[(1, 2, "x")]), ParseFailurePolicy::Error));
        assert_eq!(stores, before);

        assert!(stores.patch(&cells(&[(1, 2, "2")]), ParseFailurePolicy::Error));
        assert_eq!(stores.numeric().unwrap().len(), 2);
    }

    #[test]
    fn test_patch_refuses_failed_numeric_decoding() {
        let mut stores = SheetStores::decode(&feed(), ParseFailurePolicy::Error);
        assert!(!stores.patch(&cells(&[(1, 3, "3")]), ParseFailurePolicy::Error));
        assert!(stores.numeric().is_err());
        assert_eq!(stores.text().get(1, 3), Some(&CellValue::text("abc")));
    }
}
