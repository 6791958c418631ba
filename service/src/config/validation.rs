//! Configuration value checks

use super::ConverterConfig;
use dezmap_core::config::normalize_type;
use dezmap_core::error::{MappingError, Result};
use std::collections::HashSet;

/// Validate specific configuration values
///
/// # Errors
///
/// Returns `MappingError::Config` listing every problem found:
/// - naming convention patterns that are not valid regular expressions
/// - an empty truthy value list or empty well-known property names
/// - type table keys that collide once normalized
/// - type rules with an empty target type
pub fn validate_values(config: &ConverterConfig) -> Result<()> {
    let rules = &config.rules;
    let mut errors = Vec::new();

    for convention in &rules.naming_conventions {
        if let Err(e) = regex::Regex::new(&convention.pattern) {
            errors.push(format!(
                "naming convention pattern '{}' is invalid: {e}",
                convention.pattern
            ));
        }
        if convention.source_table.trim().is_empty() {
            errors.push(format!(
                "naming convention '{}' has no source table",
                convention.pattern
            ));
        }
    }

    let properties = &rules.properties;
    if properties.truthy_values.iter().all(|v| v.trim().is_empty()) {
        errors.push("properties.truthy_values must not be empty".to_string());
    }
    for (label, value) in [
        ("source_table_prefix", &properties.source_table_prefix),
        ("source_column_prefix", &properties.source_column_prefix),
        ("table_options", &properties.table_options),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("properties.{label} must not be empty"));
        }
    }

    let mut seen = HashSet::new();
    for (key, rule) in &rules.data_types {
        if !seen.insert(normalize_type(key)) {
            errors.push(format!(
                "data type '{key}' duplicates '{}'",
                normalize_type(key)
            ));
        }
        if rule.target.trim().is_empty() {
            errors.push(format!("data type '{key}' has an empty target"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(MappingError::config(format!(
            "Configuration validation failed:\n{}",
            errors
                .iter()
                .map(|e| format!("- {e}"))
                .collect::<Vec<_>>()
                .join("\n")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dezmap_core::config::{NamingConvention, TypeRule};

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_values(&ConverterConfig::default()).is_ok());
    }

    #[test]
    fn test_problems_are_collected() {
        let mut config = ConverterConfig::default();
        config.rules.naming_conventions.push(NamingConvention {
            pattern: "[".to_string(),
            source_table: String::new(),
            note: None,
        });
        config.rules.data_types.insert(
            "integer".to_string(),
            TypeRule {
                target: "INT64".to_string(),
                nullable: true,
            },
        );
        config.rules.properties.truthy_values.clear();

        let message = validate_values(&config).unwrap_err().to_string();
        assert!(message.contains("pattern '['"));
        assert!(message.contains("no source table"));
        assert!(message.contains("duplicates 'INTEGER'"));
        assert!(message.contains("truthy_values"));
    }
}
