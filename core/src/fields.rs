//! Cell text of each logical field
//!
//! A mapping row is written and read back through the same cell vocabulary
//! (`Y`/`N`, `PRIMARY, FOREIGN`, `Sourced`/`Derived`) in every template version.
//! Flag cells read from an existing document keep their original text when it
//! parses, so an upgrade never rewrites `PK` as `PRIMARY` or `x` as `Y`.

use crate::types::{LogicalField, ResolutionWarning, ResolvedMappingRow, SourcingKind};

const FLAG_SET: &str = "Y";

/// Text for a key designation
#[must_use]
pub fn key_label(primary: bool, foreign: bool) -> &'static str {
    match (primary, foreign) {
        (true, true) => "PRIMARY, FOREIGN",
        (true, false) => "PRIMARY",
        (false, true) => "FOREIGN",
        (false, false) => "",
    }
}

/// Parse a key designation into `(primary, foreign)`
///
/// Returns `None` when a token is neither a primary nor a foreign marker.
#[must_use]
pub fn parse_key_label(text: &str) -> Option<(bool, bool)> {
    let mut primary = false;
    let mut foreign = false;
    for token in text
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        match token.to_ascii_uppercase().as_str() {
            "PRIMARY" | "PK" => primary = true,
            "FOREIGN" | "FK" => foreign = true,
            "KEY" => {}
            _ => return None,
        }
    }
    Some((primary, foreign))
}

/// Parse a yes/no cell; empty is `false`
#[must_use]
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_uppercase().as_str() {
        "" | "N" | "NO" | "FALSE" | "0" => Some(false),
        "Y" | "YES" | "TRUE" | "1" | "X" => Some(true),
        _ => None,
    }
}

fn flag_text(value: bool) -> String {
    if value {
        FLAG_SET.to_string()
    } else {
        String::new()
    }
}

fn optional(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

impl ResolvedMappingRow {
    /// Cell text of a logical field
    #[must_use]
    pub fn field_text(&self, field: LogicalField) -> String {
        if let Some(text) = self.cell_text.get(&field) {
            return text.clone();
        }
        match field {
            LogicalField::Ordinal => self.ordinal.map(|o| o.to_string()).unwrap_or_default(),
            LogicalField::TargetTable => self.target_table.clone(),
            LogicalField::AttributeName => self.target_column.clone(),
            LogicalField::AttributeDescription => self.description.clone().unwrap_or_default(),
            LogicalField::DataType => self.data_type.clone(),
            LogicalField::Keys => key_label(self.is_primary_key, self.is_foreign_key).to_string(),
            LogicalField::SourcedDerived => self
                .sourcing
                .map(|s| s.label().to_string())
                .unwrap_or_default(),
            LogicalField::SourceTable => self.source_table.clone().unwrap_or_default(),
            LogicalField::SourceAttribute => self.source_column.clone().unwrap_or_default(),
            LogicalField::Derivation => self.derivation.clone().unwrap_or_default(),
            LogicalField::ReferencedDimension => {
                self.referenced_dimension.clone().unwrap_or_default()
            }
            LogicalField::NotNull => match self.nullable {
                Some(true) => "N".to_string(),
                Some(false) => "Y".to_string(),
                None => String::new(),
            },
            LogicalField::DefaultValue => self.defaults.value.clone(),
            LogicalField::DefaultRecord => self.defaults.record.clone(),
            LogicalField::DefaultRecordSecond => self.defaults.record_second.clone(),
            LogicalField::Clustering => flag_text(self.is_clustering_key),
            LogicalField::Partitioning => flag_text(self.is_partition_key),
            LogicalField::StagingTable => self.staging_table.clone().unwrap_or_default(),
            LogicalField::ReviewNotes => self
                .warnings
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n"),
            LogicalField::LegacyComments => String::new(),
        }
    }

    /// Store cell text into a logical field
    ///
    /// Text is copied verbatim. Values that cannot be interpreted leave the field
    /// at its empty default and add an `UnreadableLegacyValue` warning.
    pub fn set_field_text(&mut self, field: LogicalField, text: &str) {
        match field {
            LogicalField::Ordinal => {
                if text.trim().is_empty() {
                    self.ordinal = None;
                } else if let Ok(value) = text.trim().parse::<u32>() {
                    self.ordinal = Some(value);
                } else {
                    self.flag_unreadable(field, text);
                }
            }
            LogicalField::TargetTable => self.target_table = text.to_string(),
            LogicalField::AttributeName => self.target_column = text.to_string(),
            LogicalField::AttributeDescription => self.description = optional(text),
            LogicalField::DataType => self.data_type = text.to_string(),
            LogicalField::Keys => match parse_key_label(text) {
                Some((primary, foreign)) => {
                    self.is_primary_key = primary;
                    self.is_foreign_key = foreign;
                    self.keep_cell_text(field, text);
                }
                None => self.flag_unreadable(field, text),
            },
            LogicalField::SourcedDerived => match text.trim().to_ascii_lowercase().as_str() {
                "" => self.sourcing = None,
                "sourced" => {
                    self.sourcing = Some(SourcingKind::Sourced);
                    self.keep_cell_text(field, text);
                }
                "derived" => {
                    self.sourcing = Some(SourcingKind::Derived);
                    self.keep_cell_text(field, text);
                }
                _ => self.flag_unreadable(field, text),
            },
            LogicalField::SourceTable => self.source_table = optional(text),
            LogicalField::SourceAttribute => self.source_column = optional(text),
            LogicalField::Derivation => self.derivation = optional(text),
            LogicalField::ReferencedDimension => self.referenced_dimension = optional(text),
            LogicalField::NotNull if text.trim().is_empty() => self.nullable = None,
            LogicalField::NotNull => match parse_flag(text) {
                Some(not_null) => {
                    self.nullable = Some(!not_null);
                    self.keep_cell_text(field, text);
                }
                None => self.flag_unreadable(field, text),
            },
            LogicalField::DefaultValue => self.defaults.value = text.to_string(),
            LogicalField::DefaultRecord => self.defaults.record = text.to_string(),
            LogicalField::DefaultRecordSecond => self.defaults.record_second = text.to_string(),
            LogicalField::Clustering => match parse_flag(text) {
                Some(flag) => {
                    self.is_clustering_key = flag;
                    self.keep_cell_text(field, text);
                }
                None => self.flag_unreadable(field, text),
            },
            LogicalField::Partitioning => match parse_flag(text) {
                Some(flag) => {
                    self.is_partition_key = flag;
                    self.keep_cell_text(field, text);
                }
                None => self.flag_unreadable(field, text),
            },
            LogicalField::StagingTable => self.staging_table = optional(text),
            LogicalField::ReviewNotes => self.warnings.extend(
                text.lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(|line| ResolutionWarning::Carried(line.to_string())),
            ),
            LogicalField::LegacyComments => {}
        }
    }

    fn keep_cell_text(&mut self, field: LogicalField, text: &str) {
        if text.trim().is_empty() {
            self.cell_text.remove(&field);
        } else {
            self.cell_text.insert(field, text.to_string());
        }
    }

    fn flag_unreadable(&mut self, field: LogicalField, text: &str) {
        self.warnings.push(ResolutionWarning::UnreadableLegacyValue {
            field,
            value: text.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_labels() {
        assert_eq!(key_label(true, true), "PRIMARY, FOREIGN");
        assert_eq!(parse_key_label("PRIMARY, FOREIGN"), Some((true, true)));
        assert_eq!(parse_key_label("foreign key"), Some((false, true)));
        assert_eq!(parse_key_label(""), Some((false, false)));
        assert_eq!(parse_key_label("PRIMRY"), None);
    }

    #[test]
    fn test_not_null_text() {
        let mut row = ResolvedMappingRow::default();
        row.set_field_text(LogicalField::NotNull, "Y");
        assert_eq!(row.nullable, Some(false));
        assert_eq!(row.field_text(LogicalField::NotNull), "Y");

        row.set_field_text(LogicalField::NotNull, "N");
        assert_eq!(row.nullable, Some(true));
    }

    #[test]
    fn test_blank_not_null_stays_blank() {
        let mut row = ResolvedMappingRow::default();
        row.set_field_text(LogicalField::NotNull, "  ");

        assert_eq!(row.nullable, None);
        assert_eq!(row.field_text(LogicalField::NotNull), "");
        assert!(row.warnings.is_empty());
    }

    #[test]
    fn test_flag_cells_keep_original_tokens() {
        let mut row = ResolvedMappingRow::default();
        row.set_field_text(LogicalField::Keys, "PK");
        row.set_field_text(LogicalField::NotNull, "yes");
        row.set_field_text(LogicalField::SourcedDerived, "derived");

        assert!(row.is_primary_key);
        assert_eq!(row.nullable, Some(false));
        assert_eq!(row.field_text(LogicalField::Keys), "PK");
        assert_eq!(row.field_text(LogicalField::NotNull), "yes");
        assert_eq!(row.field_text(LogicalField::SourcedDerived), "derived");
    }

    #[test]
    fn test_resolved_rows_use_cell_vocabulary() {
        let row = ResolvedMappingRow {
            is_primary_key: true,
            nullable: Some(false),
            ..ResolvedMappingRow::default()
        };
        assert_eq!(row.field_text(LogicalField::Keys), "PRIMARY");
        assert_eq!(row.field_text(LogicalField::NotNull), "Y");
    }

    #[test]
    fn test_unreadable_value_flags_row() {
        let mut row = ResolvedMappingRow::default();
        row.set_field_text(LogicalField::Keys, "PRIMRY");

        assert!(!row.is_primary_key);
        assert_eq!(
            row.warnings,
            vec![ResolutionWarning::UnreadableLegacyValue {
                field: LogicalField::Keys,
                value: "PRIMRY".to_string(),
            }]
        );
    }

    #[test]
    fn test_text_is_copied_verbatim() {
        let mut row = ResolvedMappingRow::default();
        row.set_field_text(LogicalField::SourceAttribute, "  cust_no, \nacct_no ");
        assert_eq!(row.source_column.as_deref(), Some("  cust_no, \nacct_no "));
    }
}
