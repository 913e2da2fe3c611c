//! Loading reconciliation inputs.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

use gfi_core::{Inventory, Table, TableError, snapshot};

/// One labelled input inventory.
#[derive(Debug, Clone)]
pub struct Source {
    /// Column label in the output, usually the snapshot path.
    pub label: String,
    /// The inventory to compare.
    pub inventory: Inventory,
}

impl Source {
    /// Create a labelled source.
    pub fn new(label: impl Into<String>, inventory: Inventory) -> Self {
        Self {
            label: label.into(),
            inventory,
        }
    }

    /// Load a snapshot, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let inventory = snapshot::read_inventory(path)?;
        debug!(path = %path.display(), entries = inventory.count, "loaded snapshot");
        Ok(Self::new(path.to_string_lossy(), inventory))
    }
}

/// Load every snapshot in parallel. The first failure aborts the load.
pub fn load_sources(paths: &[PathBuf]) -> Result<Vec<Source>, TableError> {
    paths.par_iter().map(|p| Source::load(p)).collect()
}

/// Load every delimited table in parallel. The first failure aborts the load.
pub fn load_tables(paths: &[PathBuf], delimiter: u8) -> Result<Vec<Table>, TableError> {
    paths
        .par_iter()
        .map(|p| Table::read(p.clone(), delimiter))
        .collect()
}
