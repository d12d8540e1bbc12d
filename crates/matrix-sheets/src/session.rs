//! Session: one spreadsheet, one collaborator, one cache

use matrix_sheets_core::{CellCoord, CellElement, CellStore, Matrix, ValueMode};
use matrix_sheets_remote::{SheetDescriptor, SheetService, SpreadsheetKey};

use crate::error::{Error, Result};
use crate::options::{ReadRequest, SessionOptions};
use crate::reader::{self, ReadShape};
use crate::registry::{SheetEntry, SheetRegistry};
use crate::writer::{self, WriteSummary};

/// Read/write access to the sheets of one remote spreadsheet
///
/// A session owns its collaborator and the registry caching decoded sheets.
/// Every operation blocks on the collaborator; nothing is shared between
/// sessions.
///
/// ```
/// use matrix_sheets::{Matrix, ReadRequest, Session, SessionOptions};
/// use matrix_sheets_core::CellCoord;
/// use matrix_sheets_remote::MemoryService;
///
/// let mut service = MemoryService::new();
/// let key = service.create_spreadsheet("Book");
/// let mut session = Session::open(service, key, SessionOptions::default()).unwrap();
///
/// let data = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
/// session.write(&data, "Sheet1", CellCoord::ORIGIN).unwrap();
///
/// let back: Matrix<f64> = session.read("Sheet1", &ReadRequest::new().rows(2)).unwrap();
/// assert_eq!(back, data);
/// ```
#[derive(Debug)]
pub struct Session<S> {
    service: S,
    key: SpreadsheetKey,
    registry: SheetRegistry,
}

impl<S: SheetService> Session<S> {
    /// Open the spreadsheet `key`, enumerating its sheets.
    pub fn open(mut service: S, key: SpreadsheetKey, options: SessionOptions) -> Result<Self> {
        let registry = SheetRegistry::discover(&mut service, &key, options)?;
        tracing::debug!("Opened spreadsheet {key} with {} sheets", registry.len());
        Ok(Self {
            service,
            key,
            registry,
        })
    }

    /// Open the spreadsheet titled `name`.
    pub fn open_by_name(mut service: S, name: &str, options: SessionOptions) -> Result<Self> {
        let key = service
            .find_spreadsheet(name)?
            .ok_or_else(|| Error::SpreadsheetNotFound(name.to_string()))?;
        Self::open(service, key, options)
    }

    /// Read a rectangle from `sheet`.
    ///
    /// The element type picks the mode: `f64` reads the numeric decoding,
    /// `String` the raw text. Invalid extents give an empty matrix without
    /// contacting the service.
    pub fn read<T: CellElement>(&mut self, sheet: &str, request: &ReadRequest<T>) -> Result<Matrix<T>> {
        if ReadShape::classify(request.rows, request.cols, request.fill.is_some()) == ReadShape::Empty {
            return Ok(Matrix::empty());
        }
        let store = self.store(sheet, T::MODE)?;
        reader::read(store, request)
    }

    /// Write `matrix` to `sheet` with its top-left value at `anchor`.
    ///
    /// The sheet is created if it does not exist.
    pub fn write<T: CellElement>(
        &mut self,
        matrix: &Matrix<T>,
        sheet: &str,
        anchor: CellCoord,
    ) -> Result<WriteSummary> {
        writer::write(
            &mut self.service,
            &mut self.registry,
            &self.key,
            matrix,
            sheet,
            anchor,
        )
    }

    /// Up-to-date store of `sheet` for a read mode
    pub fn store(&mut self, sheet: &str, mode: ValueMode) -> Result<&CellStore> {
        self.registry
            .get_store(&mut self.service, &self.key, sheet, mode)
    }

    /// Names of the registered sheets, sorted
    pub fn sheet_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    /// Last seen descriptor of `sheet`, discovering it if needed
    pub fn descriptor(&mut self, sheet: &str) -> Result<&SheetDescriptor> {
        Ok(self.ensure_sheet(sheet, false)?.descriptor())
    }

    pub fn ensure_sheet(&mut self, sheet: &str, create_if_missing: bool) -> Result<&SheetEntry> {
        let entry = self
            .registry
            .ensure_sheet(&mut self.service, &self.key, sheet, create_if_missing)?;
        Ok(&*entry)
    }

    /// Drop the cached decoding of `sheet`; false if it is not registered
    pub fn invalidate(&mut self, sheet: &str) -> bool {
        self.registry.invalidate(sheet)
    }

    /// Re-enumerate remote sheets; returns how many were new
    pub fn refresh_sheets(&mut self) -> Result<usize> {
        self.registry.refresh_sheets(&mut self.service, &self.key)
    }

    /// Delete `sheet` remotely and forget it.
    pub fn delete_sheet(&mut self, sheet: &str) -> Result<()> {
        let id = self.ensure_sheet(sheet, false)?.remote_id().clone();
        self.service.delete_sheet(&self.key, &id)?;
        self.registry.remove(sheet);
        tracing::info!("Deleted sheet '{sheet}'");
        Ok(())
    }

    pub fn key(&self) -> &SpreadsheetKey {
        &self.key
    }

    pub fn options(&self) -> &SessionOptions {
        self.registry.options()
    }

    pub fn registry(&self) -> &SheetRegistry {
        &self.registry
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    pub fn into_service(self) -> S {
        self.service
    }
}
