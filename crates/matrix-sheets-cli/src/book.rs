//! The JSON book file backing the CLI
//!
//! A book is a serialized [`MemoryService`]: every spreadsheet, sheet and
//! cell, plus the service's logical clock so timestamps keep increasing
//! across invocations.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use matrix_sheets::{Session, SessionOptions, SpreadsheetKey};
use matrix_sheets_remote::MemoryService;

/// How a command picks its spreadsheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Key(String),
    Name(String),
    /// The book's only spreadsheet
    Only,
}

impl Selector {
    pub fn new(key: Option<String>, name: Option<String>) -> Self {
        match (key, name) {
            (Some(key), _) => Selector::Key(key),
            (None, Some(name)) => Selector::Name(name),
            (None, None) => Selector::Only,
        }
    }
}

pub struct Book {
    path: PathBuf,
    service: MemoryService,
}

impl Book {
    /// Load a book, starting empty if the file does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        let service = if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open book '{}'", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse book '{}'", path.display()))?
        } else {
            tracing::debug!("Book '{}' does not exist, starting empty", path.display());
            MemoryService::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            service,
        })
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.service)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write book '{}'", self.path.display()))?;
        tracing::debug!("Saved book '{}'", self.path.display());
        Ok(())
    }

    pub fn service_mut(&mut self) -> &mut MemoryService {
        &mut self.service
    }

    /// Open a session on the selected spreadsheet, borrowing the service.
    pub fn session(
        &mut self,
        selector: &Selector,
        options: SessionOptions,
    ) -> Result<Session<&mut MemoryService>> {
        let session = match selector {
            Selector::Key(key) => {
                Session::open(&mut self.service, SpreadsheetKey::new(key.as_str()), options)?
            }
            Selector::Name(name) => Session::open_by_name(&mut self.service, name, options)?,
            Selector::Only => {
                let mut all = self.service.spreadsheets();
                match all.len() {
                    1 => {
                        let (key, _) = all.remove(0);
                        Session::open(&mut self.service, key, options)?
                    }
                    0 => bail!("The book has no spreadsheets; create one with `msheet new`"),
                    n => bail!("The book has {n} spreadsheets; pick one with --key or --name"),
                }
            }
        };
        Ok(session)
    }
}
