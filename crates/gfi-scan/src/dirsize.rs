//! Per-directory size and count summaries.

use std::collections::HashMap;
use std::path::Path;

use gfi_core::{FileSystemEntry, Inventory};

/// Column names of a directory summary table.
pub const DIR_SUMMARY_HEADER: [&str; 8] = [
    "Full", "Rel", "Abs", "Name", "Time", "Size", "FileCount", "DirCount",
];

/// Aggregate totals for one directory's subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirSummary {
    /// The directory itself.
    pub entry: FileSystemEntry,
    /// Sum of file sizes below the directory.
    pub total_size: u64,
    /// Number of files below the directory.
    pub file_count: u64,
    /// Number of directories below the directory.
    pub dir_count: u64,
}

impl DirSummary {
    fn new(entry: FileSystemEntry) -> Self {
        Self {
            entry,
            total_size: 0,
            file_count: 0,
            dir_count: 0,
        }
    }

    /// Flatten into an output row matching [`DIR_SUMMARY_HEADER`].
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.entry.key.clone(),
            self.entry.relative.clone(),
            self.entry.absolute.clone(),
            self.entry.name.to_string(),
            self.entry.modified.to_string(),
            self.total_size.to_string(),
            self.file_count.to_string(),
            self.dir_count.to_string(),
        ]
    }
}

/// Compute subtree totals for every directory in an inventory.
///
/// Each entry is credited to every ancestor directory present in the
/// inventory, so the inventory must hold both files and directories. Results
/// follow the inventory's entry order.
pub fn summarize_dirs(inventory: &Inventory) -> Vec<DirSummary> {
    let mut summaries: Vec<DirSummary> = Vec::new();
    let mut by_key: HashMap<&str, usize> = HashMap::new();

    for entry in inventory.iter().filter(|e| e.is_dir()) {
        by_key.insert(entry.key.as_str(), summaries.len());
        summaries.push(DirSummary::new(entry.clone()));
    }

    for entry in inventory.iter() {
        let size = if entry.is_dir() { 0 } else { entry.size_bytes() };
        for ancestor in Path::new(&entry.key).ancestors().skip(1) {
            let Some(&slot) = ancestor.to_str().and_then(|a| by_key.get(a)) else {
                continue;
            };
            let summary = &mut summaries[slot];
            if entry.is_dir() {
                summary.dir_count += 1;
            } else {
                summary.file_count += 1;
                summary.total_size += size;
            }
        }
    }

    summaries
}
