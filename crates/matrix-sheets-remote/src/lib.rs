//! Remote sheet service interface for matrix-sheets.
//!
//! The synchronization layer never talks to a wire protocol directly. Every
//! remote interaction goes through the blocking [`SheetService`] trait:
//! enumerate sheets, create/resize/delete them, fetch cell records and submit
//! a batch of cell updates. Authentication and transport belong to whoever
//! implements the trait.
//!
//! # Architecture
//!
//! ```text
//! matrix-sheets Session
//!     └── SheetService (this crate)
//!           ├── MemoryService (in-process, used by tests and the CLI)
//!           └── your HTTP/RPC client
//! ```
//!
//! # Example
//!
//! ```rust
//! use matrix_sheets_remote::{MemoryService, SheetService};
//!
//! let mut service = MemoryService::new();
//! let key = service.create_spreadsheet("Budget");
//! let sheet = service.create_sheet(&key, "Q1", 1, 1).unwrap();
//! assert_eq!(sheet.row_count, 1);
//! assert_eq!(service.list_sheets(&key).unwrap().len(), 1);
//! ```

pub mod error;
pub mod memory;
pub mod service;
pub mod timestamp;
pub mod types;

pub use error::{MemoryError, RemoteError, RemoteResult, TimestampError};
pub use memory::{CallKind, MemoryService};
pub use service::SheetService;
pub use timestamp::Timestamp;
pub use types::{
    CellHandle, CellQuery, CellRecord, CellUpdate, SheetDescriptor, SheetId, SpreadsheetKey,
};
