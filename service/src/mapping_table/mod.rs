//! Versioned mapping from logical fields to physical spreadsheet columns
//!
//! Both the writer and the legacy upgrader go through this table, so a layout
//! change is a data change here and nowhere else.

mod builtin;
pub mod layout;

use dezmap_core::error::{MappingError, Result};
use dezmap_core::types::{LogicalField, TemplateVersion};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Where a logical field lives in one layout (zero-based coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placement {
    /// A column of the transformation table
    Column(u16),
    /// A metadata cell written once per sheet
    Cell {
        /// Row
        row: u32,
        /// Column
        col: u16,
    },
    /// The layout has no place for the field
    Absent,
}

/// How a field is filled when a row moves into this layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Copy the value
    Copy,
    /// Leave the type-appropriate empty default
    DeriveDefault,
}

/// One logical field in one template version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMappingEntry {
    /// Logical field
    pub field: LogicalField,
    /// Physical placement
    pub placement: Placement,
    /// Header caption (empty for absent fields)
    pub header: &'static str,
    /// Transform applied when filling the field
    pub transform: Transform,
}

impl ColumnMappingEntry {
    /// Column of a table entry
    #[must_use]
    pub fn column(&self) -> Option<u16> {
        match self.placement {
            Placement::Column(col) => Some(col),
            _ => None,
        }
    }
}

/// Entry sets of every supported template version
#[derive(Debug, Clone)]
pub struct ColumnMappingTable {
    layouts: BTreeMap<TemplateVersion, Vec<ColumnMappingEntry>>,
}

impl ColumnMappingTable {
    /// Built-in layouts for `1-7` and `1-11`
    ///
    /// # Errors
    ///
    /// Returns `MappingError::SelfCheck` if the built-in layouts are inconsistent.
    pub fn builtin() -> Result<Self> {
        let mut layouts = BTreeMap::new();
        layouts.insert(TemplateVersion::V1_7, builtin::legacy());
        layouts.insert(TemplateVersion::V1_11, builtin::current());
        Self::from_layouts(layouts)
    }

    /// Build a table from explicit layouts, running the self-check
    ///
    /// # Errors
    ///
    /// Returns `MappingError::SelfCheck` when a version is missing, an
    /// engine-emitted field has no entry, a field is listed twice, two entries
    /// share a placement or a placed entry has no header caption.
    pub fn from_layouts(layouts: BTreeMap<TemplateVersion, Vec<ColumnMappingEntry>>) -> Result<Self> {
        for version in TemplateVersion::ALL {
            let entries = layouts.get(&version).ok_or_else(|| {
                MappingError::SelfCheck(format!("no layout for template version {version}"))
            })?;
            check_layout(version, entries)?;
        }
        debug!("Column mapping table passed self-check");
        Ok(Self { layouts })
    }

    /// Entries of a version in declaration order
    #[must_use]
    pub fn entries(&self, version: TemplateVersion) -> &[ColumnMappingEntry] {
        self.layouts
            .get(&version)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Entry of a logical field in a version
    ///
    /// # Errors
    ///
    /// Returns `MappingError::UnknownField` if the version has no entry for the field.
    pub fn column_for(
        &self,
        version: TemplateVersion,
        field: LogicalField,
    ) -> Result<&ColumnMappingEntry> {
        self.entries(version)
            .iter()
            .find(|e| e.field == field)
            .ok_or(MappingError::UnknownField { version, field })
    }

    /// Table columns of a version ordered by column
    #[must_use]
    pub fn columns(&self, version: TemplateVersion) -> Vec<(u16, &ColumnMappingEntry)> {
        let mut columns: Vec<_> = self
            .entries(version)
            .iter()
            .filter_map(|e| e.column().map(|c| (c, e)))
            .collect();
        columns.sort_by_key(|(c, _)| *c);
        columns
    }

    /// Header captions a document of this version must carry
    ///
    /// Optional legacy columns are left out so their absence is tolerated.
    #[must_use]
    pub fn signature(&self, version: TemplateVersion) -> Vec<(u16, &'static str)> {
        self.columns(version)
            .into_iter()
            .filter(|(_, e)| !e.field.is_optional_legacy())
            .map(|(c, e)| (c, e.header))
            .collect()
    }
}

fn check_layout(version: TemplateVersion, entries: &[ColumnMappingEntry]) -> Result<()> {
    let fail = |message: String| Err(MappingError::SelfCheck(format!("{version}: {message}")));

    let mut fields = HashSet::new();
    let mut placements = HashSet::new();
    for entry in entries {
        if !fields.insert(entry.field) {
            return fail(format!("field {} listed twice", entry.field));
        }
        if entry.placement == Placement::Absent {
            continue;
        }
        if !placements.insert(entry.placement) {
            return fail(format!(
                "field {} shares its placement {:?}",
                entry.field, entry.placement
            ));
        }
        if entry.header.trim().is_empty() {
            return fail(format!("field {} has no header caption", entry.field));
        }
    }

    for field in LogicalField::ENGINE_EMITTED {
        if !fields.contains(&field) {
            return fail(format!("no entry for engine field {field}"));
        }
    }
    Ok(())
}

/// Normalize a header caption for comparison
#[must_use]
pub fn normalize_header(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Spreadsheet letters of a zero-based column (`0` is `A`)
#[must_use]
pub fn column_letter(col: u16) -> String {
    let mut n = u32::from(col) + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + u8::try_from(rem).unwrap_or(0)));
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Zero-based column of spreadsheet letters (`A` is `0`)
#[must_use]
pub fn parse_column(letters: &str) -> Option<u16> {
    let letters = letters.trim();
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let mut n: u32 = 0;
    for c in letters.to_ascii_uppercase().bytes() {
        n = n.checked_mul(26)?.checked_add(u32::from(c - b'A') + 1)?;
    }
    u16::try_from(n - 1).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(17), "R");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(parse_column("r"), Some(17));
        assert_eq!(parse_column("AB"), Some(27));
        assert_eq!(parse_column("B3"), None);
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Default  Records\n(2) "), "default records (2)");
    }

    #[test]
    fn test_entry_column() {
        let table = ColumnMappingTable::builtin().unwrap();
        let entry = table
            .column_for(TemplateVersion::V1_11, LogicalField::Keys)
            .unwrap();
        assert_eq!(entry.column(), Some(4));
        let entry = table
            .column_for(TemplateVersion::V1_11, LogicalField::TargetTable)
            .unwrap();
        assert_eq!(entry.column(), None);
    }
}
