//! Column-list row ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Ordered list of column indices used to sort string rows.
///
/// Rows compare column by column in list order, first difference wins. Rows
/// equal on every listed column fall back to a left-to-right comparison of
/// the whole row, so the resulting order never depends on input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec(Vec<usize>);

impl SortSpec {
    /// Create an ordering from column indices.
    pub fn new(columns: impl Into<Vec<usize>>) -> Self {
        Self(columns.into())
    }

    /// Listed columns.
    pub fn columns(&self) -> &[usize] {
        &self.0
    }

    /// Reject columns outside a row of `width` columns.
    pub fn validate(&self, width: usize) -> Result<(), ConfigError> {
        match self.0.iter().find(|&&index| index >= width) {
            Some(&index) => Err(ConfigError::SortColumnOutOfRange { index, width }),
            None => Ok(()),
        }
    }

    /// Compare two rows.
    pub fn compare(&self, a: &[String], b: &[String]) -> Ordering {
        self.0
            .iter()
            .map(|&i| a.get(i).cmp(&b.get(i)))
            .find(|o| o.is_ne())
            .unwrap_or_else(|| a.cmp(b))
    }

    /// Sort rows in place.
    pub fn sort_rows(&self, rows: &mut [Vec<String>]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }
}

impl FromStr for SortSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| ConfigError::InvalidSortColumn(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}
