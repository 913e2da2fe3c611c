//! Inventory builder: drains a walk into a frozen inventory.

use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::{info, warn};

use gfi_core::{ErrorPolicy, Inventory, ScanError, ScanWarning, WalkConfig};

use crate::progress::ScanProgress;
use crate::walker::Walk;

/// How many entries pass between progress updates.
const PROGRESS_INTERVAL: usize = 1000;

/// Result of building one inventory.
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// The frozen inventory.
    pub inventory: Inventory,
    /// Errors skipped under [`ErrorPolicy::Skip`].
    pub warnings: Vec<ScanWarning>,
    /// Wall time of the walk.
    pub elapsed: Duration,
}

impl BuildReport {
    /// Check if the walk found nothing to record.
    pub fn is_empty(&self) -> bool {
        self.inventory.is_empty()
    }

    /// Check if any errors were skipped.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Builds inventories from walks and publishes progress.
pub struct InventoryBuilder {
    progress_tx: broadcast::Sender<ScanProgress>,
}

impl InventoryBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Walk every root in `config` and freeze the result.
    ///
    /// This is the only consumer of the walk, so it alone applies the error
    /// policy: under fail-fast the first error is returned and the walk is
    /// dropped, which stops outstanding listings; under skip each error is
    /// logged and recorded as a warning.
    pub fn build(&self, config: &WalkConfig) -> Result<BuildReport, ScanError> {
        let start = Instant::now();
        info!(
            threads = config.parallelism(),
            roots = config.roots.len(),
            "building inventory"
        );

        let mut walk = Walk::start(config)?;
        let mut entries = Vec::new();
        let mut warnings = Vec::new();
        let mut progress = ScanProgress::new();

        while let Some(item) = walk.next() {
            match item {
                Ok(entry) => {
                    entries.push(entry);
                    if entries.len() % PROGRESS_INTERVAL == 0 {
                        progress.current_path = entries
                            .last()
                            .map(|e| e.relative.clone().into())
                            .unwrap_or_default();
                        self.publish(&walk, &mut progress, entries.len(), warnings.len(), start);
                    }
                }
                Err(err) => match config.error_policy {
                    ErrorPolicy::FailFast => return Err(err),
                    ErrorPolicy::Skip => {
                        warn!(path = %err.path().display(), "{err}. continue.");
                        warnings.push(ScanWarning::from(&err));
                    }
                },
            }
        }

        progress.finished = true;
        self.publish(&walk, &mut progress, entries.len(), warnings.len(), start);

        let mut inventory = Inventory::from_entries(entries);
        if config.sort {
            inventory.sort_by_key();
        }

        let elapsed = start.elapsed();
        info!(
            entries = inventory.count,
            warnings = warnings.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "inventory complete"
        );

        Ok(BuildReport {
            inventory,
            warnings,
            elapsed,
        })
    }

    fn publish(
        &self,
        walk: &Walk,
        progress: &mut ScanProgress,
        entries: usize,
        warnings: usize,
        start: Instant,
    ) {
        progress.entries_found = entries as u64;
        progress.dirs_listed = walk.dirs_listed();
        progress.pending = walk.pending();
        progress.warnings = warnings as u64;
        progress.elapsed = start.elapsed();
        // No subscribers is fine.
        let _ = self.progress_tx.send(progress.clone());
    }
}

impl Default for InventoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join("dir2/file4.txt"), "another file here").unwrap();

        temp
    }

    #[test]
    fn test_basic_build() {
        let temp = create_test_tree();
        let config = WalkConfig::new(temp.path());

        let report = InventoryBuilder::new().build(&config).unwrap();

        // root + 3 dirs + 4 files
        assert_eq!(report.inventory.count, 8);
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_sorted_build() {
        let temp = create_test_tree();
        let mut config = WalkConfig::new(temp.path());
        config.sort = true;

        let report = InventoryBuilder::new().build(&config).unwrap();
        let keys: Vec<&str> = report.inventory.iter().map(|e| e.key.as_str()).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_missing_root_fails_fast() {
        let config = WalkConfig::new("/this/path/does/not/exist");
        let err = InventoryBuilder::new().build(&config).unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }

    #[test]
    fn test_missing_root_skipped() {
        let temp = create_test_tree();
        let mut config = WalkConfig::new(temp.path());
        config.roots.push("/this/path/does/not/exist".into());
        config.error_policy = ErrorPolicy::Skip;

        let report = InventoryBuilder::new().build(&config).unwrap();
        assert_eq!(report.inventory.count, 8);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_final_progress_published() {
        let temp = create_test_tree();
        let builder = InventoryBuilder::new();
        let mut rx = builder.subscribe();

        builder.build(&WalkConfig::new(temp.path())).unwrap();

        let mut last = None;
        while let Ok(progress) = rx.try_recv() {
            last = Some(progress);
        }
        let last = last.unwrap();
        assert!(last.finished);
        assert_eq!(last.entries_found, 8);
        assert_eq!(last.dirs_listed, 4);
        assert_eq!(last.pending, 0);
    }

    #[test]
    fn test_intermediate_progress_counts_walk_state() {
        let temp = TempDir::new().unwrap();
        for i in 0..1200 {
            fs::write(temp.path().join(format!("f{i:04}")), "").unwrap();
        }
        let builder = InventoryBuilder::new();
        let mut rx = builder.subscribe();

        builder.build(&WalkConfig::new(temp.path())).unwrap();

        let first = rx.try_recv().unwrap();
        assert!(!first.finished);
        assert_eq!(first.entries_found, 1000);
        assert_eq!(first.dirs_listed, 1);
        // The root listing still has entries to hand over.
        assert_eq!(first.pending, 1);
    }
}
