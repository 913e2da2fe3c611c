//! User settings loaded from a TOML file.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use gfi_core::SnapshotFormat;

/// Defaults read from `config.toml`. Command-line flags win over these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Walker threads; 0 or absent uses every core.
    pub threads: Option<usize>,
    /// Skip unreadable entries instead of aborting.
    pub skip_errors: bool,
    /// Include patterns.
    pub matches: Vec<String>,
    /// Exclude patterns.
    pub ignores: Vec<String>,
    /// Input delimiter for `sum`.
    pub delimiter: Option<String>,
    /// Snapshot format for `get`.
    pub format: Option<SnapshotFormat>,
    /// Log filter directive, e.g. `info` or `gfi_scan=debug`.
    pub log_level: Option<String>,
}

impl Settings {
    /// Default config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("gfi").join("config.toml"))
    }

    /// Load settings from `explicit`, else from the default path if present.
    ///
    /// A missing default file yields defaults; a missing explicit file is an
    /// error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => match Self::config_path().filter(|p| p.is_file()) {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        let content = std::fs::read_to_string(&path)
            .wrap_err_with(|| format!("Cannot read config file {}", path.display()))?;
        let settings = Self::parse(&content)
            .wrap_err_with(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
