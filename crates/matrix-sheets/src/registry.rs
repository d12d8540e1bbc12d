//! Sheet registry and timestamp-validated cache
//!
//! The registry maps sheet names to their remote identifier, the last-modified
//! time the cached stores were decoded at, and the stores themselves. On every
//! access the remote last-modified time is refetched; the stores are rebuilt
//! from a full cell fetch only when that time is strictly newer than the one
//! recorded at the last sync. There is no partial invalidation and no eviction.

use std::collections::BTreeMap;

use matrix_sheets_core::{CellStore, ValueMode};
use matrix_sheets_remote::{SheetDescriptor, SheetId, SheetService, SpreadsheetKey, Timestamp};

use crate::decode::SheetStores;
use crate::error::{Error, Result};
use crate::options::SessionOptions;

/// Cached state of one sheet
#[derive(Debug, Clone)]
pub struct SheetEntry {
    remote_id: SheetId,
    last_sync: Option<Timestamp>,
    stores: SheetStores,
    descriptor: SheetDescriptor,
}

impl SheetEntry {
    fn new(descriptor: SheetDescriptor) -> Self {
        Self {
            remote_id: descriptor.id.clone(),
            last_sync: None,
            stores: SheetStores::default(),
            descriptor,
        }
    }

    pub fn remote_id(&self) -> &SheetId {
        &self.remote_id
    }

    /// Remote last-modified time the stores were decoded at; `None` if never
    pub fn last_sync(&self) -> Option<Timestamp> {
        self.last_sync
    }

    /// Most recently seen remote descriptor
    pub fn descriptor(&self) -> &SheetDescriptor {
        &self.descriptor
    }

    pub fn stores(&self) -> &SheetStores {
        &self.stores
    }

    pub fn store(&self, mode: ValueMode) -> Result<&CellStore> {
        self.stores.get(mode)
    }

    pub(crate) fn set_descriptor(&mut self, descriptor: SheetDescriptor) {
        self.descriptor = descriptor;
    }

    pub(crate) fn stores_mut(&mut self) -> &mut SheetStores {
        &mut self.stores
    }

    pub(crate) fn mark_synced(&mut self, at: Timestamp) {
        self.last_sync = Some(at);
    }
}

/// Session-scoped cache of sheets keyed by name
#[derive(Debug, Clone, Default)]
pub struct SheetRegistry {
    sheets: BTreeMap<String, SheetEntry>,
    options: SessionOptions,
}

impl SheetRegistry {
    /// Create an empty registry
    pub fn new(options: SessionOptions) -> Self {
        Self {
            sheets: BTreeMap::new(),
            options,
        }
    }

    /// Create a registry holding every sheet of `spreadsheet`
    pub fn discover<S: SheetService>(
        service: &mut S,
        spreadsheet: &SpreadsheetKey,
        options: SessionOptions,
    ) -> Result<Self> {
        let mut registry = Self::new(options);
        let added = registry.refresh_sheets(service, spreadsheet)?;
        tracing::debug!("Discovered {added} sheets in spreadsheet {spreadsheet}");
        Ok(registry)
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Re-enumerate remote sheets, registering any not yet known.
    ///
    /// Known sheets get their descriptor updated. A known name whose remote
    /// identifier changed (deleted and recreated elsewhere) starts over
    /// unsynced. Returns the number of newly registered sheets.
    pub fn refresh_sheets<S: SheetService>(
        &mut self,
        service: &mut S,
        spreadsheet: &SpreadsheetKey,
    ) -> Result<usize> {
        let mut added = 0;
        for descriptor in service.list_sheets(spreadsheet)? {
            if self.register(descriptor) {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Insert or update an entry; true if the name was new
    fn register(&mut self, descriptor: SheetDescriptor) -> bool {
        match self.sheets.get_mut(&descriptor.name) {
            Some(entry) if entry.remote_id == descriptor.id => {
                entry.descriptor = descriptor;
                false
            }
            Some(entry) => {
                tracing::debug!(
                    "Sheet '{}' now has remote id {}, dropping cache",
                    descriptor.name,
                    descriptor.id
                );
                *entry = SheetEntry::new(descriptor);
                false
            }
            None => {
                self.sheets
                    .insert(descriptor.name.clone(), SheetEntry::new(descriptor));
                true
            }
        }
    }

    /// Return the entry for `name`, discovering or creating the sheet if needed.
    ///
    /// An unknown name triggers one re-enumeration of the remote sheets. If
    /// the sheet still does not exist it is created with the configured
    /// initial size when `create_if_missing` is set, otherwise
    /// [`Error::SheetNotFound`] is returned.
    pub fn ensure_sheet<S: SheetService>(
        &mut self,
        service: &mut S,
        spreadsheet: &SpreadsheetKey,
        name: &str,
        create_if_missing: bool,
    ) -> Result<&mut SheetEntry> {
        if !self.sheets.contains_key(name) {
            let found = service
                .list_sheets(spreadsheet)?
                .into_iter()
                .find(|d| d.name == name);

            match found {
                Some(descriptor) => {
                    tracing::debug!("Found sheet '{name}' created since last enumeration");
                    self.register(descriptor);
                }
                None if create_if_missing => {
                    let descriptor = service.create_sheet(
                        spreadsheet,
                        name,
                        self.options.new_sheet_rows,
                        self.options.new_sheet_cols,
                    )?;
                    tracing::info!(
                        "Created sheet '{name}' ({}x{})",
                        descriptor.row_count,
                        descriptor.col_count
                    );
                    self.register(descriptor);
                }
                None => return Err(Error::SheetNotFound(name.to_string())),
            }
        }

        self.entry_mut(name)
    }

    /// Bring the cached stores of `name` up to date and return its entry.
    ///
    /// Refetches the remote descriptor; reloads the full cell feed only if
    /// the remote last-modified time is newer than the last sync.
    pub fn sync<S: SheetService>(
        &mut self,
        service: &mut S,
        spreadsheet: &SpreadsheetKey,
        name: &str,
    ) -> Result<&SheetEntry> {
        let remote_id = self
            .ensure_sheet(service, spreadsheet, name, false)?
            .remote_id
            .clone();
        let descriptor = service.sheet(spreadsheet, &remote_id)?;
        let remote_time = Timestamp::parse(&descriptor.updated)?;
        let policy = self.options.parse_failure;

        let entry = self.entry_mut(name)?;
        entry.descriptor = descriptor;

        let stale = entry.last_sync.map_or(true, |synced| remote_time > synced);
        if stale {
            tracing::debug!(
                "Reloading sheet '{name}': remote {remote_time}, cached {:?}",
                entry.last_sync.map(|t| t.to_string())
            );
            let records = service.fetch_cells(spreadsheet, &remote_id, None)?;
            entry.stores = SheetStores::decode(&records, policy);
            if let Err(err) = entry.stores.numeric() {
                tracing::debug!("Sheet '{name}' has no numeric decoding: {err}");
            }
            entry.last_sync = Some(remote_time);
        } else {
            tracing::trace!("Sheet '{name}' cache is current ({remote_time})");
        }

        Ok(&*entry)
    }

    /// Up-to-date store of `name` for a read mode (get-or-load)
    pub fn get_store<S: SheetService>(
        &mut self,
        service: &mut S,
        spreadsheet: &SpreadsheetKey,
        name: &str,
        mode: ValueMode,
    ) -> Result<&CellStore> {
        self.sync(service, spreadsheet, name)?.store(mode)
    }

    pub fn entry(&self, name: &str) -> Option<&SheetEntry> {
        self.sheets.get(name)
    }

    pub(crate) fn entry_mut(&mut self, name: &str) -> Result<&mut SheetEntry> {
        self.sheets
            .get_mut(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))
    }

    /// Forget the cached stores of `name` so the next access reloads.
    ///
    /// Returns false if the name is not registered.
    pub fn invalidate(&mut self, name: &str) -> bool {
        match self.sheets.get_mut(name) {
            Some(entry) => {
                entry.last_sync = None;
                entry.stores = SheetStores::default();
                true
            }
            None => false,
        }
    }

    /// Drop the entry for `name`
    pub fn remove(&mut self, name: &str) -> Option<SheetEntry> {
        self.sheets.remove(name)
    }

    /// Registered sheet names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sheets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
