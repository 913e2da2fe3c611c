//! Reconciliation error types.

use thiserror::Error;

use gfi_core::{ConfigError, TableError};

/// Errors that abort a reconciliation or aggregation before any output.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Fewer than two sources were given.
    #[error("At least two sources are required, got {found}")]
    InsufficientSources { found: usize },

    /// A source snapshot or table is malformed or unreadable.
    #[error(transparent)]
    Table(#[from] TableError),

    /// Caller configuration is invalid for these inputs.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
