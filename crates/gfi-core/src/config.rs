//! Walk configuration types.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::filter::PathFilter;

/// What to do when a directory or entry cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Abort the whole walk on the first error.
    #[default]
    FailFast,
    /// Log a warning and omit the affected entry or subtree.
    Skip,
}

impl ErrorPolicy {
    /// Resolve the `--err` flag.
    pub fn from_skip(skip: bool) -> Self {
        if skip { Self::Skip } else { Self::FailFast }
    }
}

/// Configuration for walking one or more roots into an inventory.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct WalkConfig {
    /// Root paths to walk, already glob-expanded.
    pub roots: Vec<PathBuf>,

    /// Pattern and kind filter applied to emitted entries.
    #[builder(default)]
    pub filter: PathFilter,

    /// Number of directory listings run at once (0 = host parallelism).
    #[builder(default = "0")]
    pub threads: usize,

    /// Descend into symlinked directories.
    #[builder(default = "false")]
    pub follow_symlinks: bool,

    /// Emit each root directory itself as an entry.
    #[builder(default = "true")]
    pub include_root: bool,

    /// Failure handling for unreadable directories and entries.
    #[builder(default)]
    pub error_policy: ErrorPolicy,

    /// Sort the finished inventory by logical key.
    #[builder(default = "false")]
    pub sort: bool,
}

impl WalkConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.roots {
            Some(roots) if roots.is_empty() => {
                Err("At least one root path is required".to_string())
            }
            Some(roots) if roots.iter().any(|r| r.as_os_str().is_empty()) => {
                Err("Root path cannot be empty".to_string())
            }
            Some(_) => Ok(()),
            None => Err("Root path is required".to_string()),
        }
    }
}

impl WalkConfig {
    /// Create a new walk config builder.
    pub fn builder() -> WalkConfigBuilder {
        WalkConfigBuilder::default()
    }

    /// Create a simple config for walking one path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
            filter: PathFilter::default(),
            threads: 0,
            follow_symlinks: false,
            include_root: true,
            error_policy: ErrorPolicy::FailFast,
            sort: false,
        }
    }

    /// Resolved worker count.
    pub fn parallelism(&self) -> usize {
        match self.threads {
            0 => std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            n => n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = WalkConfig::builder()
            .roots(vec![PathBuf::from("/home/user")])
            .threads(4usize)
            .error_policy(ErrorPolicy::Skip)
            .build()
            .unwrap();

        assert_eq!(config.roots, vec![PathBuf::from("/home/user")]);
        assert_eq!(config.parallelism(), 4);
        assert_eq!(config.error_policy, ErrorPolicy::Skip);
        assert!(config.include_root);
    }

    #[test]
    fn test_config_requires_roots() {
        assert!(WalkConfig::builder().build().is_err());
        assert!(WalkConfig::builder().roots(Vec::<PathBuf>::new()).build().is_err());
    }

    #[test]
    fn test_auto_parallelism() {
        let config = WalkConfig::new("/test");
        assert_eq!(config.threads, 0);
        assert!(config.parallelism() >= 1);
        assert_eq!(config.error_policy, ErrorPolicy::FailFast);
    }
}
