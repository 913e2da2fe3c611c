//! N-way inventory reconciliation.
//!
//! Every source is compared against every other source on its own producer
//! thread. Producers only report the value they themselves hold; a single
//! consumer merges those detections by `(key, field)` so that one discrepancy
//! seen from several sides becomes one row with several populated slots.

use std::collections::HashMap;
use std::time::Instant;

use crossbeam_channel::Sender;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gfi_core::{COUNT_KEY, DiffRecord, EntryKind, FieldKind, FileSystemEntry, PathFilter};

use crate::config::ReconcileConfig;
use crate::error::ReconcileError;
use crate::merge::fan_in;
use crate::sources::Source;

/// Fixed leading columns of a reconciliation row.
pub const DIFF_HEADER: [&str; 3] = ["Key", "Type", "FieldKind"];

/// One value reported by one source.
#[derive(Debug)]
struct Detection {
    slot: usize,
    key: String,
    field: FieldKind,
    kind: Option<EntryKind>,
    value: String,
}

/// Result of a reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffReport {
    /// Output header: fixed columns followed by one label per source.
    pub header: Vec<String>,

    /// Merged records in output order.
    pub records: Vec<DiffRecord>,

    /// Number of sources compared.
    pub source_count: usize,
}

impl DiffReport {
    /// Check if any discrepancy was found.
    pub fn has_differences(&self) -> bool {
        !self.records.is_empty()
    }

    /// Number of merged records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the report is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flatten records into output rows, in report order.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        self.records.iter().map(DiffRecord::to_row).collect()
    }
}

/// Compares inventories and merges their discrepancies.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    /// Create a reconciler with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reconciler with custom config.
    pub fn with_config(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Reconcile two or more sources.
    pub fn reconcile(&self, sources: &[Source]) -> Result<DiffReport, ReconcileError> {
        let width = sources.len();
        if width < 2 {
            return Err(ReconcileError::InsufficientSources { found: width });
        }
        self.config.sort.validate(width + DIFF_HEADER.len())?;

        let start = Instant::now();
        let indexes: Vec<HashMap<&str, &FileSystemEntry>> =
            sources.par_iter().map(|s| s.inventory.index()).collect();
        let counts: Vec<usize> = sources.iter().map(|s| s.inventory.count).collect();
        let filter = &self.config.filter;
        let indexes = &indexes;
        let counts = &counts;

        let mut merged: IndexMap<(String, FieldKind), DiffRecord> = IndexMap::new();
        fan_in(
            sources.iter().enumerate().map(|(slot, source)| {
                move |tx: &Sender<Detection>| {
                    scan_source(slot, source, indexes, counts, filter, tx);
                }
            }),
            |d: Detection| {
                merged
                    .entry((d.key.clone(), d.field))
                    .or_insert_with(|| DiffRecord::new(d.key, d.field, d.kind, width))
                    .merge(d.slot, d.kind, d.value);
            },
        );

        let mut keyed: Vec<(Vec<String>, DiffRecord)> = merged
            .into_values()
            .map(|record| (record.to_row(), record))
            .collect();
        keyed.sort_by(|a, b| self.config.sort.compare(&a.0, &b.0));
        let records: Vec<DiffRecord> = keyed.into_iter().map(|(_, record)| record).collect();

        info!(
            sources = width,
            records = records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "reconciliation complete"
        );

        let header = DIFF_HEADER
            .iter()
            .map(|h| h.to_string())
            .chain(sources.iter().map(|s| s.label.clone()))
            .collect();

        Ok(DiffReport {
            header,
            records,
            source_count: width,
        })
    }
}

/// Report everything source `slot` holds that some other source disagrees on.
fn scan_source(
    slot: usize,
    source: &Source,
    indexes: &[HashMap<&str, &FileSystemEntry>],
    counts: &[usize],
    filter: &PathFilter,
    tx: &Sender<Detection>,
) {
    let own_count = counts[slot];
    for (other, &count) in counts.iter().enumerate() {
        if other != slot && count != own_count {
            let detection = Detection {
                slot,
                key: COUNT_KEY.to_string(),
                field: FieldKind::Count,
                kind: None,
                value: own_count.to_string(),
            };
            if tx.send(detection).is_err() {
                return;
            }
        }
    }

    let mut sent = 0usize;
    for entry in source.inventory.iter() {
        if !filter.accepts(&entry.key, entry.kind) {
            continue;
        }
        for (other, index) in indexes.iter().enumerate() {
            if other == slot {
                continue;
            }
            for (field, value) in compare_entry(entry, index.get(entry.key.as_str()).copied()) {
                let detection = Detection {
                    slot,
                    key: entry.key.clone(),
                    field,
                    kind: Some(entry.kind),
                    value,
                };
                if tx.send(detection).is_err() {
                    return;
                }
                sent += 1;
            }
        }
    }
    debug!(source = %source.label, detections = sent, "source compared");
}

/// Fields of `entry` that differ from `other`, with `entry`'s own values.
fn compare_entry(
    entry: &FileSystemEntry,
    other: Option<&FileSystemEntry>,
) -> Vec<(FieldKind, String)> {
    let Some(other) = other else {
        return vec![(FieldKind::Full, entry.key.clone())];
    };

    let mut fields = Vec::new();
    if entry.modified != other.modified {
        fields.push((FieldKind::Time, entry.modified.to_string()));
    }
    if entry.size != other.size {
        fields.push((FieldKind::Size, entry.size.clone()));
    }
    if entry.mode != other.mode {
        fields.push((FieldKind::Mode, entry.mode.clone()));
    }
    fields
}
