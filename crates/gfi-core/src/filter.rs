//! Include/exclude pattern and entry kind filtering.

use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::entry::EntryKind;
use crate::error::ConfigError;

/// Which entry kinds pass a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KindFilter {
    /// Files and directories.
    #[default]
    Both,
    /// Files only.
    FilesOnly,
    /// Directories only.
    DirsOnly,
}

impl KindFilter {
    /// Resolve the pair of `--file` / `--dir` flags. Setting both means both.
    pub fn from_flags(files_only: bool, dirs_only: bool) -> Self {
        match (files_only, dirs_only) {
            (true, false) => Self::FilesOnly,
            (false, true) => Self::DirsOnly,
            _ => Self::Both,
        }
    }

    /// Check if an entry of `kind` passes.
    pub fn accepts(&self, kind: EntryKind) -> bool {
        match self {
            Self::Both => true,
            Self::FilesOnly => kind == EntryKind::File,
            Self::DirsOnly => kind == EntryKind::Directory,
        }
    }
}

/// Compiled include and exclude patterns plus a kind filter.
///
/// An entry matching any exclude pattern is dropped even when it also matches
/// an include pattern. With no include patterns every entry not excluded
/// passes.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    include: Option<RegexSet>,
    exclude: Option<RegexSet>,
    kind: KindFilter,
}

impl PathFilter {
    /// Compile include and exclude pattern lists.
    pub fn new<I, E, S, T>(includes: I, excludes: E) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Ok(Self {
            include: compile(includes)?,
            exclude: compile(excludes)?,
            kind: KindFilter::Both,
        })
    }

    /// Replace the kind filter.
    pub fn with_kind(mut self, kind: KindFilter) -> Self {
        self.kind = kind;
        self
    }

    /// Kind filter in effect.
    pub fn kind(&self) -> KindFilter {
        self.kind
    }

    /// Check only the patterns against a key.
    pub fn matches_key(&self, key: &str) -> bool {
        if self.exclude.as_ref().is_some_and(|set| set.is_match(key)) {
            return false;
        }
        self.include.as_ref().is_none_or(|set| set.is_match(key))
    }

    /// Check patterns and kind.
    pub fn accepts(&self, key: &str, kind: EntryKind) -> bool {
        self.kind.accepts(kind) && self.matches_key(key)
    }
}

fn compile<I, S>(patterns: I) -> Result<Option<RegexSet>, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let patterns: Vec<S> = patterns.into_iter().collect();
    if patterns.is_empty() {
        return Ok(None);
    }
    Ok(Some(RegexSet::new(patterns.iter().map(|p| p.as_ref()))?))
}
