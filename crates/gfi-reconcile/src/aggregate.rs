//! Column aggregation: join one value column across several tables by key.

use std::time::Instant;

use crossbeam_channel::Sender;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use gfi_core::{AggregateRow, Table};

use crate::config::AggregateConfig;
use crate::error::ReconcileError;
use crate::merge::fan_in;

/// One `(key, value)` cell read from table `slot`.
#[derive(Debug)]
struct Cell {
    slot: usize,
    key: String,
    value: String,
}

/// Result of an aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Output header: key column name followed by one label per table.
    pub header: Vec<String>,

    /// Joined rows in output order.
    pub rows: Vec<AggregateRow>,
}

impl AggregateReport {
    /// Number of joined keys.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if no key survived the filters.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flatten into output rows, in report order.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(AggregateRow::to_row).collect()
    }
}

/// Joins a value column across tables.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    config: AggregateConfig,
}

impl Aggregator {
    /// Create an aggregator with default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an aggregator with custom config.
    pub fn with_config(config: AggregateConfig) -> Self {
        Self { config }
    }

    /// Join two or more tables.
    ///
    /// Every table is checked for both columns before any row is read. A key
    /// repeated within one table keeps the value of its last row.
    pub fn aggregate(&self, tables: &[Table]) -> Result<AggregateReport, ReconcileError> {
        let width = tables.len();
        if width < 2 {
            return Err(ReconcileError::InsufficientSources { found: width });
        }
        self.config.sort.validate(width + 1)?;

        let key_column = self.config.key_column;
        let value_column = self.config.value_column;
        for table in tables {
            table.require_width(key_column.max(value_column))?;
        }
        let key_name = tables[0].header_name(key_column)?.to_string();

        let start = Instant::now();
        let filter = &self.config.filter;
        let mut joined: IndexMap<String, AggregateRow> = IndexMap::new();
        fan_in(
            tables.iter().enumerate().map(|(slot, table)| {
                move |tx: &Sender<Cell>| {
                    for row in &table.rows {
                        let (Some(key), Some(value)) =
                            (row.get(key_column), row.get(value_column))
                        else {
                            continue;
                        };
                        if !filter.matches_key(key) {
                            continue;
                        }
                        let cell = Cell {
                            slot,
                            key: key.to_string(),
                            value: value.to_string(),
                        };
                        if tx.send(cell).is_err() {
                            return;
                        }
                    }
                    debug!(table = %table.path.display(), rows = table.len(), "table read");
                }
            }),
            |cell: Cell| {
                joined
                    .entry(cell.key.clone())
                    .or_insert_with(|| AggregateRow::new(cell.key, width))
                    .set(cell.slot, cell.value);
            },
        );

        let mut keyed: Vec<(Vec<String>, AggregateRow)> =
            joined.into_values().map(|row| (row.to_row(), row)).collect();
        keyed.sort_by(|a, b| self.config.sort.compare(&a.0, &b.0));
        let rows: Vec<AggregateRow> = keyed.into_iter().map(|(_, row)| row).collect();

        info!(
            tables = width,
            keys = rows.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "aggregation complete"
        );

        let header = std::iter::once(key_name)
            .chain(tables.iter().map(Table::label))
            .collect();

        Ok(AggregateReport { header, rows })
    }
}
