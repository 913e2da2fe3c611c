//! File system entry types.

use std::fmt;
use std::fs::Metadata;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDateTime, SubsecRound};
use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ScanError;
use crate::path::{absolute_clean, share_to_local};

/// Textual layout of a serialized modification time.
pub const TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Modification time with millisecond precision in local time.
///
/// Serializes as `YYYY/MM/DD hh:mm:ss.mmm` in every snapshot form, so a value
/// read back from disk compares equal to the scanned one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModTime(NaiveDateTime);

impl ModTime {
    /// Wrap a naive local timestamp, truncating below milliseconds.
    pub fn new(time: NaiveDateTime) -> Self {
        Self(time.trunc_subsecs(3))
    }

    /// Inner timestamp.
    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }
}

impl From<std::time::SystemTime> for ModTime {
    fn from(time: std::time::SystemTime) -> Self {
        Self::new(DateTime::<Local>::from(time).naive_local())
    }
}

impl fmt::Display for ModTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

impl FromStr for ModTime {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s.trim(), TIME_FORMAT).map(Self::new)
    }
}

impl Serialize for ModTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ModTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Type of file system entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntryKind {
    /// Anything that is not a directory.
    File,
    /// Directory.
    Directory,
}

impl EntryKind {
    /// Name used in tables and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Directory => "Directory",
        }
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "File" => Ok(Self::File),
            "Directory" => Ok(Self::Directory),
            other => Err(format!("unknown entry type `{other}`")),
        }
    }
}

/// One file system object captured by a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSystemEntry {
    /// Absolute path after share rewrite; the join key across inventories.
    #[serde(rename = "full")]
    pub key: String,

    /// Path as reached from the scan root.
    #[serde(rename = "rel")]
    pub relative: String,

    /// Absolute path without share rewrite.
    #[serde(rename = "abs")]
    pub absolute: String,

    /// File name (last path component).
    pub name: CompactString,

    /// Last modification time.
    #[serde(rename = "time")]
    pub modified: ModTime,

    /// Byte count, kept as text to preserve the serialized form.
    pub size: String,

    /// Permission string, opaque to comparison.
    pub mode: String,

    /// File or directory.
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl FileSystemEntry {
    /// Build an entry for `path` from already fetched metadata.
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Result<Self, ScanError> {
        let absolute = absolute_clean(path).map_err(|e| ScanError::io(path, e))?;
        let key = absolute_clean(&share_to_local(path)).map_err(|e| ScanError::io(path, e))?;
        let modified = metadata.modified().map_err(|e| ScanError::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        Ok(Self {
            key: key.to_string_lossy().into_owned(),
            relative: path.to_string_lossy().into_owned(),
            absolute: absolute.to_string_lossy().into_owned(),
            name: name.into(),
            modified: modified.into(),
            size: metadata.len().to_string(),
            mode: mode_string(metadata),
            kind,
        })
    }

    /// Check if this entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Size parsed as a byte count, zero when the text is not numeric.
    pub fn size_bytes(&self) -> u64 {
        self.size.parse().unwrap_or(0)
    }
}

/// Render permissions as an `ls`-style string such as `drwxr-xr-x`.
pub fn mode_string(metadata: &Metadata) -> String {
    let file_type = metadata.file_type();
    let type_char = if file_type.is_dir() {
        'd'
    } else if file_type.is_symlink() {
        'L'
    } else {
        '-'
    };

    let bits = permission_bits(metadata);
    let mut out = String::with_capacity(10);
    out.push(type_char);
    for shift in [6u32, 3, 0] {
        let triple = (bits >> shift) & 0o7;
        out.push(if triple & 0o4 != 0 { 'r' } else { '-' });
        out.push(if triple & 0o2 != 0 { 'w' } else { '-' });
        out.push(if triple & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata) -> u32 {
    match (metadata.is_dir(), metadata.permissions().readonly()) {
        (true, false) => 0o777,
        (true, true) => 0o555,
        (false, false) => 0o666,
        (false, true) => 0o444,
    }
}
