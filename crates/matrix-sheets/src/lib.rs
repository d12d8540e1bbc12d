//! # matrix-sheets
//!
//! Treat the sheets of a remote spreadsheet as dense 2-D arrays.
//!
//! A [`Session`] reads rectangles of numbers or strings from named sheets
//! and writes [`Matrix`] values back. Reads go through a per-session cache
//! ([`SheetRegistry`]) that refetches a sheet's cells only when the remote
//! last-modified time moves forward. Writes create and grow sheets as needed
//! and submit every cell of the rectangle in one batch.
//!
//! ## Features
//!
//! - Numeric (`f64`) and text (`String`) reads from one cached fetch
//! - Exact rectangles with a fill value, or extents discovered from the data
//! - Configurable handling of cells that are not numbers ([`ParseFailurePolicy`])
//! - Any backend implementing [`SheetService`]; [`MemoryService`] for tests
//!
//! ## Example
//!
//! ```rust
//! use matrix_sheets::prelude::*;
//!
//! let mut service = MemoryService::new();
//! let key = service.create_spreadsheet("Results");
//! let mut session = Session::open(service, key, SessionOptions::default()).unwrap();
//!
//! let table = Matrix::from_rows(vec![
//!     vec!["name".to_string(), "score".to_string()],
//!     vec!["ada".to_string(), "12".to_string()],
//! ])
//! .unwrap();
//! session.write(&table, "Scores", CellCoord::ORIGIN).unwrap();
//!
//! // Discover the extent from the data
//! let back: Matrix<String> = session.read("Scores", &ReadRequest::new().cols(2)).unwrap();
//! assert_eq!(back, table);
//!
//! // Numeric view of the same sheet, one row below the header
//! let scores: Matrix<f64> = session
//!     .read("Scores", &ReadRequest::at(2, 2).rows(1).cols(1).fill(0.0))
//!     .unwrap();
//! assert_eq!(scores[(0, 0)], 12.0);
//! ```

pub mod decode;
pub mod error;
pub mod options;
pub mod prelude;
pub mod reader;
pub mod registry;
pub mod session;
pub mod writer;

pub use decode::{ParseFailure, SheetStores};
pub use error::{Error, Result};
pub use options::{ParseFailurePolicy, ReadRequest, SessionOptions};
pub use reader::ReadShape;
pub use registry::{SheetEntry, SheetRegistry};
pub use session::Session;
pub use writer::WriteSummary;

// Re-export core types
pub use matrix_sheets_core::{
    CellCoord, CellElement, CellRect, CellStore, CellValue, Matrix, ValueMode,
};

// Re-export the collaborator interface
pub use matrix_sheets_remote::{
    MemoryService, RemoteError, SheetDescriptor, SheetId, SheetService, SpreadsheetKey, Timestamp,
};
