//! Reconciliation and aggregation configuration.

use derive_builder::Builder;

use gfi_core::{PathFilter, SortSpec};

/// Configuration for reconciling inventories.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct ReconcileConfig {
    /// Patterns and kind filter applied to each source's entries.
    #[builder(default)]
    pub filter: PathFilter,

    /// Output ordering; columns are Key, Type, FieldKind, then one per source.
    #[builder(default = "SortSpec::new(vec![0, 1])")]
    pub sort: SortSpec,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            filter: PathFilter::default(),
            sort: SortSpec::new(vec![0, 1]),
        }
    }
}

impl ReconcileConfig {
    /// Create a new config builder.
    pub fn builder() -> ReconcileConfigBuilder {
        ReconcileConfigBuilder::default()
    }
}

/// Configuration for joining one column across tables.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct AggregateConfig {
    /// Index of the join key column.
    #[builder(default = "0")]
    pub key_column: usize,

    /// Index of the value column.
    #[builder(default = "1")]
    pub value_column: usize,

    /// Patterns applied to key values. The kind filter is ignored.
    #[builder(default)]
    pub filter: PathFilter,

    /// Output ordering; column 0 is the key, then one per table.
    #[builder(default = "SortSpec::new(vec![0])")]
    pub sort: SortSpec,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            key_column: 0,
            value_column: 1,
            filter: PathFilter::default(),
            sort: SortSpec::new(vec![0]),
        }
    }
}

impl AggregateConfig {
    /// Create a new config builder.
    pub fn builder() -> AggregateConfigBuilder {
        AggregateConfigBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_defaults() {
        let config = ReconcileConfig::builder().build().unwrap();
        assert_eq!(config.sort.columns(), &[0, 1]);
    }

    #[test]
    fn test_aggregate_builder() {
        let config = AggregateConfig::builder()
            .key_column(2usize)
            .value_column(5usize)
            .build()
            .unwrap();
        assert_eq!(config.key_column, 2);
        assert_eq!(config.value_column, 5);
        assert_eq!(config.sort.columns(), &[0]);
    }
}
