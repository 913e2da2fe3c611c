//! Core types for gfi.
//!
//! This crate provides the data model shared by the walker and the
//! reconciliation engine: file system entries, inventories, discrepancy rows,
//! path filters, row ordering and the snapshot/table codecs.

mod config;
mod diff;
mod entry;
mod error;
mod filter;
mod inventory;
mod path;
pub mod snapshot;
mod sort;
pub mod table;

pub use config::{ErrorPolicy, WalkConfig, WalkConfigBuilder};
pub use diff::{AggregateRow, COUNT_KEY, DiffRecord, FieldKind};
pub use entry::{EntryKind, FileSystemEntry, ModTime, TIME_FORMAT, mode_string};
pub use error::{ConfigError, ScanError, ScanWarning, TableError, WarningKind};
pub use filter::{KindFilter, PathFilter};
pub use inventory::Inventory;
pub use path::{absolute_clean, remote_path, share_to_local};
pub use snapshot::SnapshotFormat;
pub use sort::SortSpec;
pub use table::Table;
