//! Style templates of the mapping document layouts
//!
//! A template is a YAML asset describing how a layout looks: title, cell
//! styles, column widths and the conditional rules applied to data rows.
//! Bundled templates are used unless a path is configured.

use crate::mapping_table::parse_column;
use dezmap_core::error::{MappingError, Result};
use dezmap_core::types::{LogicalField, ResolvedMappingRow, SourcingKind, TemplateVersion};
use rust_xlsxwriter::{Color, Format, FormatBorder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

const BUNDLED_CURRENT: &str = include_str!("../../templates/mapping_1-11.yaml");
const BUNDLED_LEGACY: &str = include_str!("../../templates/mapping_1-7.yaml");

/// Optional style attributes of a cell; unset attributes are inherited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CellStyle {
    /// Bold font
    pub bold: Option<bool>,
    /// Italic font
    pub italic: Option<bool>,
    /// Font color as `RRGGBB`
    pub font_color: Option<String>,
    /// Background fill as `RRGGBB`
    pub fill: Option<String>,
    /// Thin border around the cell
    pub border: Option<bool>,
    /// Wrap text
    pub wrap: Option<bool>,
}

impl CellStyle {
    /// Style with the attributes of `over` taking precedence
    #[must_use]
    pub fn merged(&self, over: &CellStyle) -> CellStyle {
        CellStyle {
            bold: over.bold.or(self.bold),
            italic: over.italic.or(self.italic),
            font_color: over.font_color.clone().or_else(|| self.font_color.clone()),
            fill: over.fill.clone().or_else(|| self.fill.clone()),
            border: over.border.or(self.border),
            wrap: over.wrap.or(self.wrap),
        }
    }

    /// Cell format for this style
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Output` if a color is not a six-digit hex value.
    pub fn to_format(&self) -> Result<Format> {
        let mut format = Format::new();
        if self.bold == Some(true) {
            format = format.set_bold();
        }
        if self.italic == Some(true) {
            format = format.set_italic();
        }
        if let Some(color) = &self.font_color {
            format = format.set_font_color(parse_color(color)?);
        }
        if let Some(color) = &self.fill {
            format = format.set_background_color(parse_color(color)?);
        }
        if self.border == Some(true) {
            format = format.set_border(FormatBorder::Thin);
        }
        if self.wrap == Some(true) {
            format = format.set_text_wrap();
        }
        Ok(format)
    }
}

/// Parse a `RRGGBB` or `#RRGGBB` color
///
/// # Errors
///
/// Returns `MappingError::Output` for anything else.
pub fn parse_color(text: &str) -> Result<Color> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return Err(MappingError::output(format!("invalid color '{text}'")));
    }
    u32::from_str_radix(hex, 16)
        .map(Color::RGB)
        .map_err(|_| MappingError::output(format!("invalid color '{text}'")))
}

/// Condition on a row's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPredicate {
    /// Member of a primary key
    PrimaryKey,
    /// Member of a foreign key
    ForeignKey,
    /// Neither a source column nor a derivation
    SourcingUnresolved,
    /// At least one warning
    HasWarnings,
    /// Data type not in the type table
    UnrecognizedType,
    /// Clustering column
    Clustering,
    /// Partitioning column
    Partitioning,
    /// Declared or defaulted NOT NULL
    NotNull,
    /// Derived column
    Derived,
}

impl RowPredicate {
    /// Whether the row satisfies the predicate
    #[must_use]
    pub fn matches(self, row: &ResolvedMappingRow) -> bool {
        match self {
            Self::PrimaryKey => row.is_primary_key,
            Self::ForeignKey => row.is_foreign_key,
            Self::SourcingUnresolved => row.is_sourcing_unresolved(),
            Self::HasWarnings => row.has_warnings(),
            Self::UnrecognizedType => row.has_unrecognized_type(),
            Self::Clustering => row.is_clustering_key,
            Self::Partitioning => row.is_partition_key,
            Self::NotNull => row.nullable == Some(false),
            Self::Derived => row.sourcing == Some(SourcingKind::Derived),
        }
    }
}

/// Style applied to the cells of rows matching a predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatRule {
    /// Condition
    pub when: RowPredicate,
    /// Fields the style applies to; empty means the whole row
    #[serde(default)]
    pub fields: Vec<LogicalField>,
    /// Style layered over the data style
    pub style: CellStyle,
}

impl FormatRule {
    /// Whether the rule styles `field` of `row`
    #[must_use]
    pub fn applies(&self, row: &ResolvedMappingRow, field: LogicalField) -> bool {
        (self.fields.is_empty() || self.fields.contains(&field)) && self.when.matches(row)
    }
}

fn default_width() -> f64 {
    15.0
}

/// Look of one template version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleTemplate {
    /// Layout the template belongs to
    pub version: TemplateVersion,
    /// Title written to `A1` of each table sheet
    pub title: String,
    /// Title cell style
    #[serde(default)]
    pub title_style: CellStyle,
    /// Metadata label style
    #[serde(default)]
    pub label_style: CellStyle,
    /// Metadata value style
    #[serde(default)]
    pub value_style: CellStyle,
    /// Table header style
    #[serde(default)]
    pub header_style: CellStyle,
    /// Base style of data cells
    #[serde(default)]
    pub data_style: CellStyle,
    /// Width of columns without an explicit width
    #[serde(default = "default_width")]
    pub default_column_width: f64,
    /// Widths by column letter
    #[serde(default)]
    pub column_widths: BTreeMap<String, f64>,
    /// Conditional rules, later rules win
    #[serde(default)]
    pub rules: Vec<FormatRule>,
}

impl StyleTemplate {
    /// Template bundled with the crate
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Output` if the bundled asset is invalid.
    pub fn bundled(version: TemplateVersion) -> Result<Self> {
        let text = match version {
            TemplateVersion::V1_11 => BUNDLED_CURRENT,
            TemplateVersion::V1_7 => BUNDLED_LEGACY,
        };
        Self::parse(text, version, None)
    }

    /// Template read from a YAML file
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Output` with the path if the file is missing,
    /// is not a valid template or belongs to another version.
    pub fn load(path: &Path, version: TemplateVersion) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            MappingError::output_at(format!("cannot read template: {e}"), path)
        })?;
        debug!("Loaded style template {}", path.display());
        Self::parse(&text, version, Some(path))
    }

    fn parse(text: &str, version: TemplateVersion, origin: Option<&Path>) -> Result<Self> {
        let fail = |message: String| match origin {
            Some(path) => MappingError::output_at(message, path),
            None => MappingError::output(message),
        };

        let template: Self = serde_yaml::from_str(text)
            .map_err(|e| fail(format!("invalid template for version {version}: {e}")))?;
        if template.version != version {
            return Err(fail(format!(
                "template is for version {}, expected {version}",
                template.version
            )));
        }
        for letters in template.column_widths.keys() {
            if parse_column(letters).is_none() {
                return Err(fail(format!("invalid column '{letters}' in column widths")));
            }
        }
        let styles = [
            &template.title_style,
            &template.label_style,
            &template.value_style,
            &template.header_style,
            &template.data_style,
        ];
        for style in styles.into_iter().chain(template.rules.iter().map(|r| &r.style)) {
            style
                .to_format()
                .map_err(|e| fail(format!("invalid style: {e}")))?;
        }
        Ok(template)
    }

    /// Width of a zero-based column
    #[must_use]
    pub fn column_width(&self, col: u16) -> f64 {
        self.column_widths
            .iter()
            .find(|(letters, _)| parse_column(letters) == Some(col))
            .map_or(self.default_column_width, |(_, width)| *width)
    }

    /// Style of one data cell after the matching rules are layered on
    #[must_use]
    pub fn cell_style(
        &self,
        row: &ResolvedMappingRow,
        field: LogicalField,
        with_rules: bool,
    ) -> CellStyle {
        if !with_rules {
            return self.data_style.clone();
        }
        self.rules
            .iter()
            .filter(|rule| rule.applies(row, field))
            .fold(self.data_style.clone(), |style, rule| style.merged(&rule.style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bundled_templates_parse() {
        for version in TemplateVersion::ALL {
            let template = StyleTemplate::bundled(version).unwrap();
            assert_eq!(template.version, version);
            assert!(!template.rules.is_empty());
        }
    }

    #[test]
    fn test_rules_layer_in_order() {
        let template = StyleTemplate::bundled(TemplateVersion::V1_11).unwrap();
        let row = ResolvedMappingRow {
            is_primary_key: true,
            ..ResolvedMappingRow::default()
        };

        let style = template.cell_style(&row, LogicalField::AttributeName, true);
        assert_eq!(style.bold, Some(true));
        assert_eq!(style.fill.as_deref(), Some("FFC000"));

        let plain = template.cell_style(&row, LogicalField::AttributeName, false);
        assert_eq!(plain, template.data_style);
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let err = StyleTemplate::parse(BUNDLED_LEGACY, TemplateVersion::V1_11, None).unwrap_err();
        assert!(matches!(err, MappingError::Output { .. }));
    }

    #[test]
    fn test_color_parsing() {
        assert!(parse_color("#FFC000").is_ok());
        assert!(parse_color("FFC00").is_err());
        assert!(parse_color("GGGGGG").is_err());
    }
}
