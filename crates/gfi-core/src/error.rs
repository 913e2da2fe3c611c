//! Error types shared across gfi crates.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while accessing the file system during a walk.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// Directory was already visited through another link.
    #[error("Directory cycle detected: {path}")]
    Cycle { path: PathBuf },

    /// Worker pool could not be started.
    #[error("Cannot start worker pool: {message}")]
    Pool { message: String },
}

impl ScanError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// Path the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::NotADirectory { path }
            | Self::Cycle { path } => path,
            Self::Pool { .. } => std::path::Path::new(""),
        }
    }

    /// Warning kind used when this error is skipped instead of raised.
    pub fn warning_kind(&self) -> WarningKind {
        match self {
            Self::PermissionDenied { .. } => WarningKind::PermissionDenied,
            Self::NotFound { .. } => WarningKind::NotFound,
            Self::Io { .. } | Self::NotADirectory { .. } | Self::Pool { .. } => {
                WarningKind::ReadError
            }
            Self::Cycle { .. } => WarningKind::Cycle,
        }
    }
}

/// Errors in the shape or persistence of snapshots and tables.
#[derive(Debug, Error)]
pub enum TableError {
    /// Input file could not be opened or read.
    #[error("Cannot read {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delimited input could not be parsed.
    #[error("Malformed table {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Structured snapshot could not be parsed or encoded.
    #[error("Malformed snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A required column is absent from the header.
    #[error("{path}: missing column `{column}`")]
    MissingColumn { path: PathBuf, column: String },

    /// A row has fewer fields than a required column index.
    #[error("{path}: line {line} has {width} fields, column {column} required")]
    ShortRow {
        path: PathBuf,
        line: u64,
        width: usize,
        column: usize,
    },

    /// A field could not be interpreted.
    #[error("{path}: line {line}: invalid {column} value `{value}`")]
    InvalidField {
        path: PathBuf,
        line: u64,
        column: String,
        value: String,
    },

    /// Output could not be created or written.
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors in caller-supplied configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A pattern failed to compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A sort column is not a number.
    #[error("Invalid sort column `{0}`")]
    InvalidSortColumn(String),

    /// A sort column exceeds the row width.
    #[error("Sort column {index} out of range for {width} columns")]
    SortColumnOutOfRange { index: usize, width: usize },

    /// Delimiter is not a single byte.
    #[error("Delimiter must be a single byte, got `{0}`")]
    InvalidDelimiter(String),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    Builder(String),
}

/// Kind of scan warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Path vanished or a link target does not exist.
    NotFound,
    /// Error reading a directory or metadata.
    ReadError,
    /// Directory reached twice through symlinks.
    Cycle,
}

/// Non-fatal warning recorded under the skip policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl ScanWarning {
    /// Create a new scan warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }
}

impl From<&ScanError> for ScanWarning {
    fn from(err: &ScanError) -> Self {
        Self::new(err.path(), err.to_string(), err.warning_kind())
    }
}
