//! Partition and cluster columns declared in table-option DDL
//!
//! ```text
//! PARTITION BY TIMESTAMP_TRUNC(created_at, DAY)
//! CLUSTER BY region, customer_id
//! ```

use super::properties::column_list;
use regex::Regex;
use std::sync::LazyLock;

/// `PARTITION BY fn(column, ...)`
static PARTITION_BY_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)PARTITION\s+BY\s+[A-Za-z_][\w.]*\s*\(\s*([^),\s]+)")
        .expect("Valid partition regex pattern")
});

/// `PARTITION BY column`
static PARTITION_BY_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)PARTITION\s+BY\s+([A-Za-z_]\w*)\s*(?:$|[\r\n;]|CLUSTER)")
        .expect("Valid partition column regex pattern")
});

/// `CLUSTER BY a, b` up to the end of the line or statement
static CLUSTER_BY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)CLUSTER\s+BY\s+([^\r\n;]+)").expect("Valid cluster regex pattern")
});

/// Columns named by table-option DDL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Partitioning column, if any
    pub partition_column: Option<String>,
    /// Clustering columns in declaration order
    pub cluster_columns: Vec<String>,
}

impl TableOptions {
    /// Scan a DDL snippet
    #[must_use]
    pub fn parse(ddl: &str) -> Self {
        let partition_column = PARTITION_BY_CALL
            .captures(ddl)
            .or_else(|| PARTITION_BY_COLUMN.captures(ddl))
            .map(|caps| caps[1].trim_matches('`').to_string());

        let cluster_columns = CLUSTER_BY
            .captures(ddl)
            .map(|caps| {
                let list = caps[1].to_string();
                column_list(&list).map(ToString::to_string).collect()
            })
            .unwrap_or_default();

        Self {
            partition_column,
            cluster_columns,
        }
    }

    /// Whether `column` is the partitioning column
    #[must_use]
    pub fn partitions_by(&self, column: &str) -> bool {
        self.partition_column
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(column))
    }

    /// Whether `column` is a clustering column
    #[must_use]
    pub fn clusters_by(&self, column: &str) -> bool {
        self.cluster_columns
            .iter()
            .any(|c| c.eq_ignore_ascii_case(column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partition_function_and_cluster_list() {
        let options = TableOptions::parse(
            "PARTITION BY TIMESTAMP_TRUNC(created_at, DAY)\nCLUSTER BY region, customer_id",
        );
        assert_eq!(options.partition_column.as_deref(), Some("created_at"));
        assert_eq!(options.cluster_columns, vec!["region", "customer_id"]);
        assert!(options.clusters_by("CUSTOMER_ID"));
        assert!(!options.partitions_by("region"));
    }

    #[test]
    fn test_plain_partition_column() {
        let options = TableOptions::parse("partition by order_date cluster by status");
        assert_eq!(options.partition_column.as_deref(), Some("order_date"));
        assert_eq!(options.cluster_columns, vec!["status"]);
    }

    #[test]
    fn test_empty_options() {
        assert_eq!(TableOptions::parse(""), TableOptions::default());
    }
}
