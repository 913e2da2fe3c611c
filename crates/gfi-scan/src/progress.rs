//! Walk progress reporting.

use std::path::PathBuf;
use std::time::Duration;

/// Progress information while an inventory is being built.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Entries accepted so far.
    pub entries_found: u64,
    /// Directories listed so far.
    pub dirs_listed: u64,
    /// Directory listings queued or running.
    pub pending: usize,
    /// Warnings recorded under the skip policy.
    pub warnings: u64,
    /// Most recently received path.
    pub current_path: PathBuf,
    /// Time elapsed since the walk started.
    pub elapsed: Duration,
    /// Whether this is the final update of the run.
    pub finished: bool,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            entries_found: 0,
            dirs_listed: 0,
            pending: 0,
            warnings: 0,
            current_path: PathBuf::new(),
            elapsed: Duration::ZERO,
            finished: false,
        }
    }

    /// Calculate rate in entries per second.
    pub fn entries_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.entries_found as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}
