//! Delimited table reading and writing.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};

use crate::error::{ConfigError, TableError};

/// A delimited file loaded into memory: one header row plus data rows.
#[derive(Debug, Clone)]
pub struct Table {
    /// Source path, used as the column label in joined output.
    pub path: PathBuf,
    /// Header row.
    pub header: StringRecord,
    /// Data rows in file order.
    pub rows: Vec<StringRecord>,
}

impl Table {
    /// Read a table with the given delimiter. The first row is the header.
    pub fn read(path: impl Into<PathBuf>, delimiter: u8) -> Result<Self, TableError> {
        let path = path.into();
        let file = File::open(&path).map_err(|source| TableError::Open {
            path: path.clone(),
            source,
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .has_headers(true)
            .from_reader(file);

        let header = reader
            .headers()
            .map_err(|source| TableError::Csv {
                path: path.clone(),
                source,
            })?
            .clone();

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| TableError::Csv {
                path: path.clone(),
                source,
            })?;

        Ok(Self { path, header, rows })
    }

    /// Index of a header column by name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }

    /// Index of a header column by name, or a missing-column error.
    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column(name).ok_or_else(|| TableError::MissingColumn {
            path: self.path.clone(),
            column: name.to_string(),
        })
    }

    /// Header name at `index`, or a missing-column error.
    pub fn header_name(&self, index: usize) -> Result<&str, TableError> {
        self.header.get(index).ok_or_else(|| TableError::MissingColumn {
            path: self.path.clone(),
            column: index.to_string(),
        })
    }

    /// Check that every row holds `column`.
    pub fn require_width(&self, column: usize) -> Result<(), TableError> {
        match self.rows.iter().find(|row| row.len() <= column) {
            Some(row) => Err(TableError::ShortRow {
                path: self.path.clone(),
                line: line_of(row),
                width: row.len(),
                column,
            }),
            None => Ok(()),
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Label used for this table in joined output.
    pub fn label(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// 1-based line number of a record, 0 if unknown.
pub fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Parse a delimiter argument: a single byte, or `\t` / `tab`.
pub fn parse_delimiter(text: &str) -> Result<u8, ConfigError> {
    match text {
        "\\t" | "tab" | "TAB" => Ok(b'\t'),
        _ if text.len() == 1 => Ok(text.as_bytes()[0]),
        _ => Err(ConfigError::InvalidDelimiter(text.to_string())),
    }
}

/// Write a header and rows to `path`, creating parent directories.
pub fn write_rows<H, R>(path: &Path, header: &[H], rows: R, delimiter: u8) -> Result<(), TableError>
where
    H: AsRef<str>,
    R: IntoIterator,
    R::Item: IntoIterator,
    <R::Item as IntoIterator>::Item: AsRef<[u8]>,
{
    let file = create_output(path)?;
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::CRLF)
        .flexible(true)
        .from_writer(file);

    let csv_err = |source: csv::Error| TableError::Csv {
        path: path.to_path_buf(),
        source,
    };

    writer
        .write_record(header.iter().map(|h| h.as_ref()))
        .map_err(csv_err)?;
    for row in rows {
        writer.write_record(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| TableError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Create an output file, making parent directories as needed.
pub fn create_output(path: &Path) -> Result<File, TableError> {
    let write_err = |source| TableError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    File::create(path).map_err(write_err)
}
