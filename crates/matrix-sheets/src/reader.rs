//! Rectangle reader
//!
//! Extracts a dense [`Matrix`] from a sparse [`CellStore`]. The extent of the
//! read is either given exactly (with a fill value for absent cells) or
//! discovered by scanning the store from the anchor:
//!
//! - rows given: every row must exist; the column count is the shortest
//!   contiguous run of cells across those rows
//! - only columns given: rows are counted while each one has all requested
//!   columns
//!
//! A rectangle given without a fill value is still validated against the
//! store, so `rows=2, cols=3` without fill fails on a row with two cells
//! while the same request with a fill value succeeds.

use matrix_sheets_core::{CellCoord, CellElement, CellStore, Matrix};

use crate::error::{Error, Result};
use crate::options::ReadRequest;

/// How a read determines its extent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadShape {
    /// Negative extents or both zero: nothing is read
    Empty,
    /// Exactly `rows` x `cols`, absent cells become the fill value
    ExactFill { rows: u32, cols: u32 },
    /// `rows` rows, columns discovered (at most, and at least, `cols` if given)
    RowDriven { rows: u32, cols: Option<u32> },
    /// Rows discovered while each holds `cols` contiguous cells
    ColumnDriven { cols: u32 },
}

impl ReadShape {
    /// Pick the read mode for the requested extents
    pub fn classify(rows: i64, cols: i64, has_fill: bool) -> Self {
        if rows < 0 || cols < 0 || (rows == 0 && cols == 0) {
            return ReadShape::Empty;
        }
        let rows = clamp(rows);
        let cols = clamp(cols);

        if rows > 0 && cols > 0 && has_fill {
            ReadShape::ExactFill { rows, cols }
        } else if rows > 0 {
            ReadShape::RowDriven {
                rows,
                cols: (cols > 0).then_some(cols),
            }
        } else {
            ReadShape::ColumnDriven { cols }
        }
    }
}

fn clamp(n: i64) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Read a rectangle from `store`
pub fn read<T: CellElement>(store: &CellStore, request: &ReadRequest<T>) -> Result<Matrix<T>> {
    let shape = ReadShape::classify(request.rows, request.cols, request.fill.is_some());
    let (rows, cols) = resolve_extent(store, request.anchor, shape)?;
    materialize(store, request.anchor, rows, cols, request.fill.as_ref())
}

/// Determine `(rows, cols)` to read for `shape`
pub fn resolve_extent(store: &CellStore, anchor: CellCoord, shape: ReadShape) -> Result<(u32, u32)> {
    match shape {
        ReadShape::Empty => Ok((0, 0)),
        ReadShape::ExactFill { rows, cols } => Ok((rows, cols)),
        ReadShape::RowDriven { rows, cols } => {
            let mut read_cols = u32::MAX;
            for row in row_range(anchor.row, rows) {
                if !store.has_row(row) {
                    return Err(Error::RowNotFound { row });
                }
                let run = run_length(store, row, anchor.col, cols);
                if let Some(required) = cols {
                    if run < required {
                        return Err(Error::InsufficientColumns {
                            row,
                            found: run,
                            required,
                        });
                    }
                }
                read_cols = read_cols.min(run);
                if read_cols == 0 {
                    return Err(Error::EmptyRow { row });
                }
            }
            Ok((rows, read_cols))
        }
        ReadShape::ColumnDriven { cols } => {
            let mut count = 0;
            let mut row = anchor.row;
            while store.has_row(row) && run_length(store, row, anchor.col, Some(cols)) == cols {
                count += 1;
                match row.checked_add(1) {
                    Some(next) => row = next,
                    None => break,
                }
            }
            Ok((count, cols))
        }
    }
}

/// Consecutive present cells in `row` from `start`, stopping at `limit`
fn run_length(store: &CellStore, row: u32, start: u32, limit: Option<u32>) -> u32 {
    let mut run = 0;
    while limit.map_or(true, |l| run < l) {
        match start.checked_add(run) {
            Some(col) if store.has_cell(row, col) => run += 1,
            _ => break,
        }
    }
    run
}

fn row_range(start: u32, count: u32) -> impl Iterator<Item = u32> {
    (0..count).map_while(move |i| start.checked_add(i))
}

fn materialize<T: CellElement>(
    store: &CellStore,
    anchor: CellCoord,
    rows: u32,
    cols: u32,
    fill: Option<&T>,
) -> Result<Matrix<T>> {
    if rows == 0 || cols == 0 {
        return Ok(Matrix::from_vec(rows as usize, cols as usize, Vec::new())?);
    }

    let too_large = || Error::TooLarge { rows, cols };
    let len = (rows as usize).checked_mul(cols as usize).ok_or_else(too_large)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| too_large())?;
    for row in row_range(anchor.row, rows) {
        for col in row_range(anchor.col, cols) {
            let value = match (store.get(row, col), fill) {
                (Some(cell), _) => T::from_cell(cell).ok_or(Error::NotNumeric { row, col })?,
                (None, Some(fill)) => fill.clone(),
                (None, None) => return Err(Error::MissingCell { row, col }),
            };
            data.push(value);
        }
    }

    Ok(Matrix::from_vec(rows as usize, cols as usize, data)?)
}
