//! Rule tables driving the derivation engine
//!
//! Every convention the engine applies (type mapping, default values,
//! well-known property names, source naming conventions) is data held here,
//! so new conventions are added by configuration rather than code.

use crate::types::DefaultValues;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Complete rule set for deriving mapping rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Source data type (upper case, no length) to target type
    pub data_types: IndexMap<String, TypeRule>,

    /// Default values per target data type
    pub default_values: IndexMap<String, DefaultValues>,

    /// Default values chosen by column name, checked before the type table
    pub default_overrides: Vec<DefaultOverride>,

    /// Well-known user-defined property names
    pub properties: PropertyNames,

    /// Source-system naming conventions for passthrough columns
    pub naming_conventions: Vec<NamingConvention>,
}

/// Target type and default nullability for one source type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRule {
    /// Canonical target type
    pub target: String,
    /// Nullability used when the attribute does not declare one
    #[serde(default = "default_true")]
    pub nullable: bool,
}

fn default_true() -> bool {
    true
}

impl TypeRule {
    fn to(target: &str) -> Self {
        Self {
            target: target.to_string(),
            nullable: true,
        }
    }
}

/// Default values selected by a fragment of the column name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultOverride {
    /// Case-insensitive fragment of the column name
    pub name_contains: String,
    /// Restrict the override to one target type
    #[serde(default)]
    pub data_type: Option<String>,
    /// Values to use
    pub values: DefaultValues,
}

/// Names of the user-defined properties the engine interprets
///
/// Names are compared case-insensitively after removing a leading ordering
/// prefix such as `01_`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyNames {
    /// Properties marking a clustering column
    pub clustering: Vec<String>,
    /// Properties marking a partitioning column
    pub partitioning: Vec<String>,
    /// Derivation properties, in precedence order
    pub derivation: Vec<String>,
    /// Prefix of source table properties (`source_table_1`, ...)
    pub source_table_prefix: String,
    /// Prefix of source column properties
    pub source_column_prefix: String,
    /// Prefix of source database properties
    pub source_database_prefix: String,
    /// Properties naming a staging table or static dataset
    pub staging_table: Vec<String>,
    /// Entity property holding partition/cluster DDL
    pub table_options: String,
    /// Property values read as "set"
    pub truthy_values: Vec<String>,
    /// Separator between several source tables or columns
    pub source_separator: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            clustering: vec!["clustering".to_string(), "cluster_key".to_string()],
            partitioning: vec!["partitioning".to_string(), "partition_key".to_string()],
            derivation: vec![
                "derivation".to_string(),
                "business_rule".to_string(),
                "transformation".to_string(),
            ],
            source_table_prefix: "source_table".to_string(),
            source_column_prefix: "source_column".to_string(),
            source_database_prefix: "source_database".to_string(),
            staging_table: vec!["staging_table".to_string(), "static_dataset".to_string()],
            table_options: "table_options".to_string(),
            truthy_values: ["y", "yes", "true", "1", "x"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            source_separator: ", ".to_string(),
        }
    }
}

/// Passthrough convention: a column whose name matches `pattern` is copied
/// with the same name and type from `source_table`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    /// Regular expression matched against the attribute name
    pub pattern: String,
    /// Source table; `{entity}` is replaced by the entity name
    pub source_table: String,
    /// Derivation note written for inferred rows
    #[serde(default)]
    pub note: Option<String>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        let mut data_types = IndexMap::new();
        for (source, target) in [
            ("INTEGER", "INT64"),
            ("INT", "INT64"),
            ("SMALLINT", "INT64"),
            ("BIGINT", "INT64"),
            ("INT64", "INT64"),
            ("VARCHAR", "STRING"),
            ("CHAR", "STRING"),
            ("TEXT", "STRING"),
            ("NVARCHAR", "STRING"),
            ("STRING", "STRING"),
            ("DECIMAL", "NUMERIC"),
            ("NUMERIC", "NUMERIC"),
            ("FLOAT", "FLOAT64"),
            ("DOUBLE", "FLOAT64"),
            ("REAL", "FLOAT64"),
            ("FLOAT64", "FLOAT64"),
            ("DATE", "DATE"),
            ("DATETIME", "DATETIME"),
            ("TIMESTAMP", "TIMESTAMP"),
            ("BOOLEAN", "BOOL"),
            ("BOOL", "BOOL"),
        ] {
            data_types.insert(source.to_string(), TypeRule::to(target));
        }

        let mut default_values = IndexMap::new();
        let ts_start = "\"1900-01-01 00:00:00.0000\"";
        let ts_end = "\"9999-12-31 23:59:59.9999\"";
        default_values.insert(
            "TIMESTAMP".to_string(),
            DefaultValues::new(ts_start, ts_start, ts_end),
        );
        default_values.insert(
            "DATETIME".to_string(),
            DefaultValues::new(ts_start, ts_start, ts_end),
        );
        default_values.insert(
            "DATE".to_string(),
            DefaultValues::new("\"1900-01-01\"", "\"1900-01-01\"", "\"9999-12-31\""),
        );
        default_values.insert("INT64".to_string(), DefaultValues::new("-1", "-1", "-2"));
        default_values.insert("STRING".to_string(), DefaultValues::new("\"\"", "\"\"", "\"\""));
        default_values.insert("BOOL".to_string(), DefaultValues::new("NULL", "NULL", "NULL"));
        default_values.insert("NUMERIC".to_string(), DefaultValues::new("0", "0", "0"));
        default_values.insert(
            "FLOAT64".to_string(),
            DefaultValues::new("\"0.0\"", "\"0.0\"", "\"0.0\""),
        );

        Self {
            data_types,
            default_values,
            default_overrides: vec![
                DefaultOverride {
                    name_contains: "effective_start".to_string(),
                    data_type: None,
                    values: DefaultValues::new(ts_start, ts_start, ts_start),
                },
                DefaultOverride {
                    name_contains: "effective_end".to_string(),
                    data_type: None,
                    values: DefaultValues::new(ts_end, ts_end, ts_end),
                },
            ],
            properties: PropertyNames::default(),
            naming_conventions: Vec::new(),
        }
    }
}

impl RulesConfig {
    /// Type rule for a declared data type
    ///
    /// The lookup ignores case, surrounding whitespace and a parenthesized
    /// length or precision (`VARCHAR(50)`).
    #[must_use]
    pub fn type_rule(&self, declared: &str) -> Option<&TypeRule> {
        self.data_types.get(&normalize_type(declared))
    }

    /// Rules with type table keys in lookup form (`varchar(10)` becomes `VARCHAR`)
    ///
    /// When two keys normalize to the same type the first one is kept.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let mut data_types = IndexMap::with_capacity(self.data_types.len());
        for (key, rule) in self.data_types {
            data_types.entry(normalize_type(&key)).or_insert(rule);
        }
        let mut default_values = IndexMap::with_capacity(self.default_values.len());
        for (key, values) in self.default_values {
            default_values.entry(normalize_type(&key)).or_insert(values);
        }
        self.data_types = data_types;
        self.default_values = default_values;
        self
    }
}

/// Normalize a declared data type for table lookup
#[must_use]
pub fn normalize_type(declared: &str) -> String {
    let base = declared.split('(').next().unwrap_or(declared);
    base.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_rules() {
        let rules = RulesConfig::default();
        assert_eq!(rules.type_rule("integer").map(|r| r.target.as_str()), Some("INT64"));
        assert_eq!(rules.type_rule("VARCHAR(50)").map(|r| r.target.as_str()), Some("STRING"));
        assert!(rules.type_rule("TIMESTAMP_NTZ").is_none());
        assert_eq!(rules.default_values["INT64"].record_second, "-2");
        assert!(rules.naming_conventions.is_empty());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r"
properties:
  clustering: [cluster_marker]
naming_conventions:
  - pattern: '^src_'
    source_table: 'stg_{entity}'
";
        let rules: RulesConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules.properties.clustering, vec!["cluster_marker".to_string()]);
        assert_eq!(rules.properties.table_options, "table_options");
        assert_eq!(rules.naming_conventions.len(), 1);
        assert!(rules.data_types.contains_key("BIGINT"));
    }

    #[test]
    fn test_normalized_keys() {
        let yaml = r"
data_types:
  number(38): { target: NUMERIC }
  Varchar2: { target: STRING, nullable: false }
";
        let rules: RulesConfig = serde_yaml::from_str(yaml).unwrap();
        let rules = rules.normalized();
        assert_eq!(rules.type_rule("NUMBER").map(|r| r.target.as_str()), Some("NUMERIC"));
        assert_eq!(rules.type_rule("varchar2(20)").map(|r| r.nullable), Some(false));
    }
}
