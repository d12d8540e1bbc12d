//! # matrix-sheets-core
//!
//! Core data structures for the matrix-sheets library.
//!
//! This crate provides the plain in-memory types the synchronization layer is
//! built from:
//! - [`CellCoord`] and [`CellRect`] - 1-based cell addressing
//! - [`CellValue`] - a numeric or textual cell value
//! - [`CellStore`] - a sparse row/column map of one sheet's cells
//! - [`Matrix`] - a dense, row-major 2-D array
//!
//! ## Example
//!
//! ```rust
//! use matrix_sheets_core::{CellStore, CellValue, Matrix};
//!
//! let mut store = CellStore::new();
//! store.set(1, 1, CellValue::Number(1.0));
//! store.set(1, 2, CellValue::Number(2.0));
//! assert!(store.has_row(1));
//! assert!(!store.has_cell(2, 1));
//!
//! let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
//! assert_eq!(m.shape(), (2, 2));
//! assert_eq!(m[(1, 0)], 3.0);
//! ```

pub mod coord;
pub mod error;
pub mod matrix;
pub mod store;
pub mod value;

pub use coord::{CellCoord, CellRect};
pub use error::{Error, Result};
pub use matrix::Matrix;
pub use store::CellStore;
pub use value::{CellElement, CellValue, ValueMode};
