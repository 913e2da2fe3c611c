//! Discrepancy and aggregate rows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entry::EntryKind;

/// Synthetic key used for inventory count mismatches.
pub const COUNT_KEY: &str = "Count";

/// Which field of an entry differs between sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKind {
    /// Entry present in one source, absent in another.
    Full,
    /// Modification time differs.
    Time,
    /// Size differs.
    Size,
    /// Permission string differs.
    Mode,
    /// Inventory entry counts differ.
    Count,
}

impl FieldKind {
    /// Name used in output tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "Full",
            Self::Time => "Time",
            Self::Size => "Size",
            Self::Mode => "Mode",
            Self::Count => "Count",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One merged discrepancy: a `(key, field)` pair with one slot per source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    /// Logical key, or [`COUNT_KEY`].
    pub key: String,
    /// Differing field.
    pub field: FieldKind,
    /// Kind of the entry; `None` for count records.
    pub kind: Option<EntryKind>,
    /// Value reported by each source, positionally indexed.
    pub values: Vec<Option<String>>,
}

impl DiffRecord {
    /// Allocate a record with `width` empty slots.
    pub fn new(
        key: impl Into<String>,
        field: FieldKind,
        kind: Option<EntryKind>,
        width: usize,
    ) -> Self {
        Self {
            key: key.into(),
            field,
            kind,
            values: vec![None; width],
        }
    }

    /// Store the value reported by source `slot`.
    pub fn set(&mut self, slot: usize, value: impl Into<String>) {
        if let Some(cell) = self.values.get_mut(slot) {
            *cell = Some(value.into());
        }
    }

    /// Store a detection from source `slot`.
    ///
    /// The record's kind is the one seen by the lowest slot that reported,
    /// whatever order detections arrive in.
    pub fn merge(&mut self, slot: usize, kind: Option<EntryKind>, value: impl Into<String>) {
        let lowest = self.values.iter().take(slot).all(Option::is_none);
        if lowest {
            self.kind = kind;
        }
        self.set(slot, value);
    }

    /// Slot value, if that source reported one.
    pub fn value(&self, slot: usize) -> Option<&str> {
        self.values.get(slot).and_then(|v| v.as_deref())
    }

    /// Number of sources that reported a value.
    pub fn populated(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Flatten into an output row: key, type, field, then one column per source.
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(self.values.len() + 3);
        row.push(self.key.clone());
        row.push(self.kind.map(|k| k.as_str().to_string()).unwrap_or_default());
        row.push(self.field.as_str().to_string());
        row.extend(self.values.iter().map(|v| v.clone().unwrap_or_default()));
        row
    }
}

/// One joined key with one value slot per input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Key column value.
    pub key: String,
    /// Value from each table, positionally indexed.
    pub values: Vec<Option<String>>,
}

impl AggregateRow {
    /// Allocate a row with `width` empty slots.
    pub fn new(key: impl Into<String>, width: usize) -> Self {
        Self {
            key: key.into(),
            values: vec![None; width],
        }
    }

    /// Store the value read from table `slot`.
    pub fn set(&mut self, slot: usize, value: impl Into<String>) {
        if let Some(cell) = self.values.get_mut(slot) {
            *cell = Some(value.into());
        }
    }

    /// Flatten into an output row: key, then one column per table.
    pub fn to_row(&self) -> Vec<String> {
        std::iter::once(self.key.clone())
            .chain(self.values.iter().map(|v| v.clone().unwrap_or_default()))
            .collect()
    }
}
