//! Persisted inventory snapshots in tabular or structured form.

use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entry::{EntryKind, FileSystemEntry, ModTime};
use crate::error::TableError;
use crate::inventory::Inventory;
use crate::table::{Table, create_output, write_rows};

/// Column names of a tabular snapshot, in output order.
pub const INVENTORY_HEADER: [&str; 8] =
    ["Full", "Rel", "Abs", "Name", "Time", "Size", "Mode", "Type"];

/// On-disk snapshot layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    /// Comma separated.
    #[default]
    Csv,
    /// Tab separated.
    Tsv,
    /// `{count, entries}` JSON object.
    Json,
}

impl SnapshotFormat {
    /// Infer the format from a file extension; unknown extensions read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => Self::Json,
            Some("tsv") | Some("tab") | Some("txt") => Self::Tsv,
            _ => Self::Csv,
        }
    }

    /// File extension for output names.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
        }
    }

    /// Field delimiter for tabular forms.
    pub fn delimiter(&self) -> u8 {
        match self {
            Self::Tsv => b'\t',
            _ => b',',
        }
    }
}

/// Flatten an entry into a tabular snapshot row.
pub fn entry_to_row(entry: &FileSystemEntry) -> [String; 8] {
    [
        entry.key.clone(),
        entry.relative.clone(),
        entry.absolute.clone(),
        entry.name.to_string(),
        entry.modified.to_string(),
        entry.size.clone(),
        entry.mode.clone(),
        entry.kind.to_string(),
    ]
}

/// Write an inventory in the given format.
pub fn write_inventory(
    path: &Path,
    inventory: &Inventory,
    format: SnapshotFormat,
) -> Result<(), TableError> {
    match format {
        SnapshotFormat::Json => {
            let file = create_output(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, inventory).map_err(|source| TableError::Json {
                path: path.to_path_buf(),
                source,
            })?;
            writer.flush().map_err(|source| TableError::Write {
                path: path.to_path_buf(),
                source,
            })
        }
        SnapshotFormat::Csv | SnapshotFormat::Tsv => write_rows(
            path,
            &INVENTORY_HEADER,
            inventory.iter().map(entry_to_row),
            format.delimiter(),
        ),
    }
}

/// Read an inventory, choosing the format from the file extension.
pub fn read_inventory(path: &Path) -> Result<Inventory, TableError> {
    read_inventory_as(path, SnapshotFormat::from_path(path))
}

/// Read an inventory in an explicit format.
pub fn read_inventory_as(path: &Path, format: SnapshotFormat) -> Result<Inventory, TableError> {
    match format {
        SnapshotFormat::Json => {
            let text = std::fs::read_to_string(path).map_err(|source| TableError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            serde_json::from_str(&text).map_err(|source| TableError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
        SnapshotFormat::Csv | SnapshotFormat::Tsv => {
            let table = Table::read(path, format.delimiter())?;
            inventory_from_table(&table)
        }
    }
}

/// Interpret a loaded table as a tabular snapshot.
///
/// Columns are located by header name, so extra columns and any column order
/// are accepted. Every snapshot column must be present.
pub fn inventory_from_table(table: &Table) -> Result<Inventory, TableError> {
    let mut columns = [0usize; 8];
    for (slot, name) in columns.iter_mut().zip(INVENTORY_HEADER) {
        *slot = table.require_column(name)?;
    }
    if let Some(&widest) = columns.iter().max() {
        table.require_width(widest)?;
    }
    let [full, rel, abs, name, time, size, mode, kind] = columns;

    let mut entries = Vec::with_capacity(table.len());
    for row in &table.rows {
        let field = |i: usize| row.get(i).unwrap_or_default();
        let invalid = |column: &str, value: &str| TableError::InvalidField {
            path: table.path.clone(),
            line: crate::table::line_of(row),
            column: column.to_string(),
            value: value.to_string(),
        };

        entries.push(FileSystemEntry {
            key: field(full).to_string(),
            relative: field(rel).to_string(),
            absolute: field(abs).to_string(),
            name: field(name).into(),
            modified: field(time).parse::<ModTime>().map_err(|_| invalid("Time", field(time)))?,
            size: field(size).to_string(),
            mode: field(mode).to_string(),
            kind: field(kind).parse::<EntryKind>().map_err(|_| invalid("Type", field(kind)))?,
        });
    }

    Ok(Inventory::from_entries(entries))
}
