//! Bounded parallel directory walker.
//!
//! Each directory listing is one task on a dedicated rayon pool whose width is
//! the configured parallelism, so at most that many listings run at once and
//! the rest wait in the pool's work-stealing queues. Entries are handed to the
//! consumer one at a time over a zero-capacity channel: a task blocks until
//! the consumer takes its entry.
//!
//! ```text
//! roots ──► pool task per directory ──► rendezvous channel ──► Walk (Iterator)
//!              │   ▲
//!              └───┘ sub-directories spawn new tasks
//! ```
//!
//! The stream ends when the last task finishes and drops its sender. Dropping
//! the [`Walk`] early makes every outstanding task stop at its next send.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, bounded};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, trace};

use gfi_core::{FileSystemEntry, PathFilter, ScanError, WalkConfig};

use crate::visited::{Ancestors, DirIdentity};

/// One item of the walk stream.
pub type WalkItem = Result<FileSystemEntry, ScanError>;

/// State shared by every task of one walk.
struct Shared {
    filter: PathFilter,
    follow_symlinks: bool,
    include_root: bool,
    pending: AtomicUsize,
    dirs_listed: AtomicU64,
    closed: AtomicBool,
}

impl Shared {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }

    /// Hand an item to the consumer. Returns `false` once the consumer is gone.
    fn emit(&self, tx: &Sender<WalkItem>, item: WalkItem) -> bool {
        if tx.send(item).is_err() {
            self.closed.store(true, Ordering::Relaxed);
            return false;
        }
        true
    }

    /// Chain for descending from `ancestors` into a directory, or `None` when
    /// that directory is already one of its own ancestors.
    fn enter(&self, ancestors: &Ancestors, metadata: &fs::Metadata) -> Option<Ancestors> {
        if !self.follow_symlinks {
            return Some(Ancestors::new());
        }
        match DirIdentity::of(metadata) {
            Some(id) if ancestors.contains(id) => None,
            Some(id) => Some(ancestors.child(id)),
            None => Some(ancestors.clone()),
        }
    }
}

/// Releases a pending slot when a task ends, however it ends.
struct TaskGuard(Arc<Shared>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let left = self.0.pending.fetch_sub(1, Ordering::AcqRel) - 1;
        if left == 0 {
            debug!("walk complete");
        }
    }
}

/// A running walk: a lazy, unordered stream of entries or per-entry errors.
pub struct Walk {
    rx: Receiver<WalkItem>,
    shared: Arc<Shared>,
    _pool: ThreadPool,
}

impl Walk {
    /// Start walking every root in `config`.
    ///
    /// Each root is its own task. Errors are not acted on here; they travel
    /// through the stream and the consumer decides whether to abort or skip.
    pub fn start(config: &WalkConfig) -> Result<Self, ScanError> {
        let threads = config.parallelism();
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("gfi-walk-{i}"))
            .build()
            .map_err(|e| ScanError::Pool {
                message: e.to_string(),
            })?;

        let shared = Arc::new(Shared {
            filter: config.filter.clone(),
            follow_symlinks: config.follow_symlinks,
            include_root: config.include_root,
            pending: AtomicUsize::new(0),
            dirs_listed: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        });

        let (tx, rx) = bounded(0);
        debug!(threads, roots = config.roots.len(), "starting walk");

        for root in &config.roots {
            let shared = Arc::clone(&shared);
            let tx = tx.clone();
            let root = root.clone();
            shared.pending.fetch_add(1, Ordering::AcqRel);
            pool.spawn(move || {
                let _guard = TaskGuard(Arc::clone(&shared));
                visit_root(&shared, &root, &tx);
            });
        }

        Ok(Self {
            rx,
            shared,
            _pool: pool,
        })
    }

    /// Directory listings queued or running.
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::Acquire)
    }

    /// Directories listed so far.
    pub fn dirs_listed(&self) -> u64 {
        self.shared.dirs_listed.load(Ordering::Relaxed)
    }
}

impl Iterator for Walk {
    type Item = WalkItem;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.recv().ok()
    }
}

impl Drop for Walk {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Relaxed);
    }
}

/// Stat a root, emit it, and list it.
fn visit_root(shared: &Arc<Shared>, root: &Path, tx: &Sender<WalkItem>) {
    let metadata = match fs::metadata(root) {
        Ok(m) => m,
        Err(e) => {
            shared.emit(tx, Err(ScanError::io(root, e)));
            return;
        }
    };
    if !metadata.is_dir() {
        shared.emit(
            tx,
            Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            }),
        );
        return;
    }

    if shared.include_root {
        match FileSystemEntry::from_metadata(root, &metadata) {
            Ok(entry) => {
                if shared.filter.accepts(&entry.key, entry.kind) && !shared.emit(tx, Ok(entry)) {
                    return;
                }
            }
            Err(err) => {
                if !shared.emit(tx, Err(err)) {
                    return;
                }
            }
        }
    }

    if let Some(ancestors) = shared.enter(&Ancestors::new(), &metadata) {
        list_dir(shared, root, &ancestors, tx);
    }
}

/// List one directory: emit its children and spawn a task per sub-directory.
fn list_dir(shared: &Arc<Shared>, dir: &Path, ancestors: &Ancestors, tx: &Sender<WalkItem>) {
    if shared.is_closed() {
        return;
    }
    trace!(dir = %dir.display(), "listing");

    let read_dir = match fs::read_dir(dir) {
        Ok(r) => r,
        Err(e) => {
            shared.emit(tx, Err(ScanError::io(dir, e)));
            return;
        }
    };
    shared.dirs_listed.fetch_add(1, Ordering::Relaxed);

    for dirent in read_dir {
        if shared.is_closed() {
            return;
        }

        let path = match dirent {
            Ok(d) => d.path(),
            Err(e) => {
                if !shared.emit(tx, Err(ScanError::io(dir, e))) {
                    return;
                }
                continue;
            }
        };

        let metadata = if shared.follow_symlinks {
            fs::metadata(&path)
        } else {
            fs::symlink_metadata(&path)
        };
        let metadata = match metadata {
            Ok(m) => m,
            Err(e) => {
                if !shared.emit(tx, Err(ScanError::io(&path, e))) {
                    return;
                }
                continue;
            }
        };

        let entry = match FileSystemEntry::from_metadata(&path, &metadata) {
            Ok(entry) => entry,
            Err(err) => {
                if !shared.emit(tx, Err(err)) {
                    return;
                }
                continue;
            }
        };

        if metadata.is_dir() {
            match shared.enter(ancestors, &metadata) {
                Some(chain) => spawn_dir(shared, tx, path, chain),
                None => {
                    if !shared.emit(tx, Err(ScanError::Cycle { path })) {
                        return;
                    }
                }
            }
        }

        if shared.filter.accepts(&entry.key, entry.kind) && !shared.emit(tx, Ok(entry)) {
            return;
        }
    }
}

/// Queue a sub-directory listing on the current pool.
fn spawn_dir(shared: &Arc<Shared>, tx: &Sender<WalkItem>, dir: PathBuf, ancestors: Ancestors) {
    let shared = Arc::clone(shared);
    // Each task owns a sender; the channel closes when the last one drops.
    let tx = tx.clone();
    shared.pending.fetch_add(1, Ordering::AcqRel);
    rayon::spawn(move || {
        let _guard = TaskGuard(Arc::clone(&shared));
        list_dir(&shared, &dir, &ancestors, &tx);
    });
}
