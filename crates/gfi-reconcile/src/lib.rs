//! Inventory reconciliation for gfi.
//!
//! This crate compares inventories and joins delimited tables:
//!
//! - **Reconciliation** - N-way field comparison of inventories, merged into
//!   one row per `(key, field)` discrepancy
//! - **Aggregation** - join one value column across tables by a key column
//!
//! # Reconciliation
//!
//! Each source is scanned against every other source on its own thread. A
//! source only reports its own value for a discrepancy; the single consumer
//! merges reports sharing `(key, field)` into one [`DiffRecord`] so the output
//! never repeats a discrepancy.
//!
//! ```rust,ignore
//! use gfi_reconcile::{Reconciler, load_sources};
//!
//! let sources = load_sources(&["before.csv".into(), "after.csv".into()])?;
//! let report = Reconciler::new().reconcile(&sources)?;
//!
//! for row in report.to_rows() {
//!     println!("{}", row.join(","));
//! }
//! ```
//!
//! # Aggregation
//!
//! ```rust,ignore
//! use gfi_reconcile::{AggregateConfig, Aggregator, load_tables};
//!
//! let tables = load_tables(&["jan.csv".into(), "feb.csv".into()], b',')?;
//! let config = AggregateConfig::builder().value_column(3usize).build()?;
//! let report = Aggregator::with_config(config).aggregate(&tables)?;
//! println!("{} keys", report.len());
//! ```

mod aggregate;
mod config;
mod engine;
mod error;
mod merge;
mod sources;

pub use aggregate::{AggregateReport, Aggregator};
pub use config::{AggregateConfig, AggregateConfigBuilder, ReconcileConfig, ReconcileConfigBuilder};
pub use engine::{DIFF_HEADER, DiffReport, Reconciler};
pub use error::ReconcileError;
pub use sources::{Source, load_sources, load_tables};

// Re-export core types
pub use gfi_core::{AggregateRow, DiffRecord, FieldKind, Inventory, PathFilter, SortSpec, Table};
