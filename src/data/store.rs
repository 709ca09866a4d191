use std::path::{Path, PathBuf};

use super::loader;
use super::model::Table;
use crate::error::{DatasetError, Result};

/// Rows handed back by [`Dataset::load`] for a quick look.
pub const PREVIEW_ROWS: usize = 5;

/// Where to read the dataset from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// An explicit file path.
    File(PathBuf),
    /// Walk this directory and take the first CSV found.
    Discover(PathBuf),
}

impl DatasetSource {
    /// Turn the source into a concrete, existing file path.
    pub fn resolve(&self) -> Result<PathBuf> {
        match self {
            DatasetSource::File(path) if path.is_file() => Ok(path.clone()),
            DatasetSource::File(path) => Err(DatasetError::SourceNotFound(path.clone())),
            DatasetSource::Discover(root) => loader::discover_csv(root).ok_or_else(|| {
                log::warn!("No csv file found under {}", root.display());
                DatasetError::SourceNotFound(root.clone())
            }),
        }
    }
}

/// Owner of the single in-memory table.
///
/// The store is either empty or holds one well-formed table. Every operation
/// other than `load`, `replace` and `clear` goes through [`Dataset::current`]
/// or [`Dataset::current_mut`] and fails with [`DatasetError::NotLoaded`]
/// while the store is empty.
#[derive(Debug, Default)]
pub struct Dataset {
    table: Option<Table>,
    path: Option<PathBuf>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the source fully into memory, replacing any loaded table.
    /// Returns the first [`PREVIEW_ROWS`] rows.
    pub fn load(&mut self, source: &DatasetSource) -> Result<Table> {
        let path = source.resolve()?;
        let table = loader::load_file(&path).map_err(|e| DatasetError::LoadFailure {
            path: path.clone(),
            source: e.into(),
        })?;
        log::info!(
            "Loaded {} rows with columns {:?} from {}",
            table.len(),
            table.columns(),
            path.display()
        );
        let preview = table.head(PREVIEW_ROWS);
        self.table = Some(table);
        self.path = Some(path);
        Ok(preview)
    }

    pub fn current(&self) -> Result<&Table> {
        self.table.as_ref().ok_or(DatasetError::NotLoaded)
    }

    pub fn current_mut(&mut self) -> Result<&mut Table> {
        self.table.as_mut().ok_or(DatasetError::NotLoaded)
    }

    /// Install `table` in place of the current one.
    pub fn replace(&mut self, table: Table) -> Result<()> {
        table.validate()?;
        match &self.table {
            Some(old) => log::info!(
                "Dataset replaced: {}x{} -> {}x{}",
                old.len(),
                old.width(),
                table.len(),
                table.width()
            ),
            None => log::info!("Dataset set: {}x{}", table.len(), table.width()),
        }
        self.table = Some(table);
        Ok(())
    }

    /// Discard the table. Clearing an empty store is a no-op.
    pub fn clear(&mut self) {
        if self.table.take().is_some() {
            log::info!("Dataset removed");
        }
        self.path = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    /// File the current table was loaded from, if it came from `load`.
    pub fn source_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
