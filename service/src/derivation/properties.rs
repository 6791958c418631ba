//! Lookup of well-known user-defined properties

use dezmap_core::types::{Properties, SourceDependency};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Leading ordering prefix of property names (`01_source_table_1`)
static ORDER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+_").expect("Valid order prefix regex pattern"));

/// Entity sourcing property (`01_source_database_1`): group, kind, index
static SOURCE_PROPERTY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d+)_source_(database|table|column)(?:_(\d+))?$")
        .expect("Valid source property regex pattern")
});

/// Normalize a property name for comparison: lower case, no ordering prefix
#[must_use]
pub fn property_key(name: &str) -> String {
    ORDER_PREFIX.replace(name.trim(), "").to_ascii_lowercase()
}

/// Properties whose normalized name is one of `names`, in document order
pub fn named<'a, 'n>(
    properties: &'a Properties,
    names: &'n [String],
) -> impl Iterator<Item = (&'a str, &'a str)> {
    properties.iter().filter_map(move |(name, value)| {
        let key = property_key(name);
        names
            .iter()
            .any(|n| n.eq_ignore_ascii_case(&key))
            .then_some((name.as_str(), value.as_str()))
    })
}

/// Non-empty values of properties whose normalized name starts with `prefix`
pub fn prefixed<'a>(
    properties: &'a Properties,
    prefix: &str,
) -> impl Iterator<Item = &'a str> {
    let prefix = prefix.to_ascii_lowercase();
    properties.iter().filter_map(move |(name, value)| {
        (property_key(name).starts_with(&prefix) && !value.trim().is_empty())
            .then_some(value.as_str())
    })
}

/// Whether a property value reads as "set"
#[must_use]
pub fn is_truthy(value: &str, truthy_values: &[String]) -> bool {
    let value = value.trim();
    truthy_values.iter().any(|t| t.eq_ignore_ascii_case(value))
}

/// Split a column list (`a, b c`) into names
pub fn column_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(|s| s.trim_matches(|c: char| c == '`' || c == '"'))
        .filter(|s| !s.is_empty())
}

/// Sourcing dependencies declared on an entity, ordered by group number
#[must_use]
pub fn source_dependencies(properties: &Properties) -> Vec<SourceDependency> {
    let mut groups: BTreeMap<u32, SourceDependency> = BTreeMap::new();
    for (name, value) in properties {
        let Some(caps) = SOURCE_PROPERTY.captures(name.trim()) else {
            continue;
        };
        let Ok(group) = caps[1].parse::<u32>() else {
            continue;
        };
        let dependency = groups.entry(group).or_default();
        match caps[2].to_ascii_lowercase().as_str() {
            "database" => dependency.database.clone_from(value),
            "table" => dependency.table.clone_from(value),
            _ => dependency.column.clone_from(value),
        }
    }
    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_property_key() {
        assert_eq!(property_key("01_Source_Table_1"), "source_table_1");
        assert_eq!(property_key("Clustering"), "clustering");
        assert_eq!(property_key("source_01"), "source_01");
    }

    #[test]
    fn test_prefixed_values_keep_document_order() {
        let p = props(&[
            ("source_table_2", "crm.accounts"),
            ("derivation", "x"),
            ("02_source_table_1", "crm.customers"),
            ("source_table_3", "  "),
        ]);
        let values: Vec<&str> = prefixed(&p, "source_table").collect();
        assert_eq!(values, vec!["crm.accounts", "crm.customers"]);
    }

    #[test]
    fn test_source_dependencies_grouped() {
        let p = props(&[
            ("02_source_table_1", "orders"),
            ("01_source_database_1", "erp"),
            ("01_source_table_1", "customers"),
            ("02_source_database_1", "erp"),
            ("01_source_column_1", "cust_no"),
            ("table_options", "PARTITION BY DATE(created_at)"),
        ]);
        assert_eq!(
            source_dependencies(&p),
            vec![
                SourceDependency {
                    database: "erp".to_string(),
                    table: "customers".to_string(),
                    column: "cust_no".to_string(),
                },
                SourceDependency {
                    database: "erp".to_string(),
                    table: "orders".to_string(),
                    column: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_column_list() {
        let cols: Vec<&str> = column_list("region, `order_date` status").collect();
        assert_eq!(cols, vec!["region", "order_date", "status"]);
    }
}
