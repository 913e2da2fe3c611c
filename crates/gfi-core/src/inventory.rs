//! Inventory container.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entry::FileSystemEntry;

/// Entries captured in one scan pass plus their count.
///
/// Built once by the inventory builder, optionally sorted by logical key, and
/// treated as read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// Number of entries recorded when the inventory was frozen.
    pub count: usize,
    /// Captured entries.
    pub entries: Vec<FileSystemEntry>,
}

impl Inventory {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Freeze a set of entries, recording their count.
    pub fn from_entries(entries: Vec<FileSystemEntry>) -> Self {
        Self {
            count: entries.len(),
            entries,
        }
    }

    /// Order entries by logical key.
    pub fn sort_by_key(&mut self) {
        self.entries.sort_unstable_by(|a, b| a.key.cmp(&b.key));
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the scan produced nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries.
    pub fn iter(&self) -> std::slice::Iter<'_, FileSystemEntry> {
        self.entries.iter()
    }

    /// Map logical keys to entries. A repeated key keeps its last entry.
    pub fn index(&self) -> HashMap<&str, &FileSystemEntry> {
        self.entries.iter().map(|e| (e.key.as_str(), e)).collect()
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a FileSystemEntry;
    type IntoIter = std::slice::Iter<'a, FileSystemEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
