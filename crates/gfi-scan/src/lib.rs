//! Tree walking and inventory building for gfi.
//!
//! # Overview
//!
//! `gfi-scan` turns one or more root directories into an [`Inventory`]:
//!
//! - **Bounded parallel walk** on a rayon pool sized to the host (or the
//!   configured thread count), one task per directory listing
//! - **Rendezvous handoff** of entries to a single consumer
//! - **Error policy** applied by the consumer: fail fast or skip with warnings
//! - **Progress updates** via broadcast channels
//!
//! # Example
//!
//! ```rust,no_run
//! use gfi_scan::{InventoryBuilder, WalkConfig};
//!
//! let config = WalkConfig::new("/path/to/scan");
//! let report = InventoryBuilder::new().build(&config).unwrap();
//!
//! println!("Entries: {}", report.inventory.count);
//! println!("Warnings: {}", report.warnings.len());
//! ```
//!
//! The raw stream is available too, for callers that want entries as they
//! arrive:
//!
//! ```rust,no_run
//! use gfi_scan::{Walk, WalkConfig};
//!
//! let walk = Walk::start(&WalkConfig::new("/path/to/scan")).unwrap();
//! for item in walk {
//!     match item {
//!         Ok(entry) => println!("{}", entry.key),
//!         Err(err) => eprintln!("{err}"),
//!     }
//! }
//! ```

mod builder;
mod dirsize;
mod progress;
mod visited;
mod walker;

pub use builder::{BuildReport, InventoryBuilder};
pub use dirsize::{DIR_SUMMARY_HEADER, DirSummary, summarize_dirs};
pub use progress::ScanProgress;
pub use visited::{Ancestors, DirIdentity};
pub use walker::{Walk, WalkItem};

// Re-export core types for convenience
pub use gfi_core::{
    EntryKind, ErrorPolicy, FileSystemEntry, Inventory, KindFilter, PathFilter, ScanError,
    ScanWarning, WalkConfig, WarningKind,
};
