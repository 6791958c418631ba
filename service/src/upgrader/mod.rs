//! Legacy mapping document upgrader
//!
//! Reads a workbook in the legacy layout, checks its header signature and
//! re-projects every populated column through the column mapping table. The
//! result is a [`MappingDocument`] ready for the writer; fields the legacy
//! layout lacks keep their empty defaults and are never inferred.

pub mod grid;

use crate::mapping_table::{ColumnMappingTable, Placement, Transform, layout, normalize_header};
use calamine::{Reader, Xlsx};
use dezmap_core::error::{MappingError, Result};
use dezmap_core::types::{
    LogicalField, MappingDocument, MappingSheet, ResolutionWarning, ResolvedMappingRow,
    SourceDependency, TableMetadata, TemplateVersion,
};
use grid::Grid;
use regex::Regex;
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Sheets holding transformation tables
static TABLE_SHEET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*Transformation\s*-\s*Sourcing").expect("Valid sheet name regex pattern")
});

/// Rows searched for the `#` header
const HEADER_SEARCH_ROWS: usize = 100;

/// Upgrader from one template version to another
#[derive(Debug, Clone)]
pub struct LegacyUpgrader {
    table: ColumnMappingTable,
    from: TemplateVersion,
    to: TemplateVersion,
}

impl LegacyUpgrader {
    /// Upgrader from the legacy layout to the current one
    #[must_use]
    pub fn new(table: ColumnMappingTable) -> Self {
        Self {
            table,
            from: TemplateVersion::LEGACY,
            to: TemplateVersion::CURRENT,
        }
    }

    /// Layout the upgraded rows are meant for
    #[must_use]
    pub fn target_version(&self) -> TemplateVersion {
        self.to
    }

    /// Read a legacy document from disk
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Io` if the file cannot be read, and the errors of
    /// [`LegacyUpgrader::upgrade_bytes`].
    pub fn upgrade(&self, path: &Path) -> Result<MappingDocument> {
        let bytes = std::fs::read(path)?;
        info!("Upgrading {}", path.display());
        self.upgrade_bytes(bytes)
    }

    /// Read a legacy document from memory
    ///
    /// # Errors
    ///
    /// Returns `MappingError::FormatMismatch` if the bytes are not a workbook,
    /// no `Transformation - Sourcing` sheet exists, or a sheet lacks the `#`
    /// header row or the legacy header signature.
    pub fn upgrade_bytes(&self, bytes: Vec<u8>) -> Result<MappingDocument> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
            .map_err(|e| MappingError::format_mismatch(format!("not a readable workbook: {e}")))?;

        let names: Vec<String> = workbook
            .sheet_names()
            .iter()
            .filter(|name| TABLE_SHEET.is_match(name))
            .cloned()
            .collect();
        if names.is_empty() {
            return Err(MappingError::format_mismatch(format!(
                "no '{}' sheet found",
                layout::SHEET_PREFIX
            )));
        }

        let mut document = MappingDocument::default();
        for name in names {
            let range = workbook.worksheet_range(&name).map_err(|e| {
                MappingError::format_mismatch_in(format!("cannot read sheet: {e}"), name.as_str())
            })?;
            let sheet = self.read_sheet(&name, &Grid::from_range(&range))?;
            debug!(
                "Sheet '{name}': table '{}' with {} rows",
                sheet.table.name,
                sheet.rows.len()
            );
            document.sheets.push(sheet);
        }

        info!(
            "Read {} tables with {} rows from {} layout",
            document.sheets.len(),
            document.row_count(),
            self.from
        );
        Ok(document)
    }

    fn read_sheet(&self, sheet: &str, grid: &Grid) -> Result<MappingSheet> {
        let header_row = (0..grid.height().min(HEADER_SEARCH_ROWS))
            .find(|&r| normalize_header(grid.cell(r, 0)) == "#")
            .ok_or_else(|| MappingError::format_mismatch_in("no '#' header row", sheet))?;

        for (col, expected) in self.table.signature(self.from) {
            let found = grid.cell(header_row, usize::from(col));
            if normalize_header(found) != normalize_header(expected) {
                return Err(MappingError::format_mismatch_in(
                    format!(
                        "column {} is '{found}', expected '{expected}'",
                        crate::mapping_table::column_letter(col)
                    ),
                    sheet,
                ));
            }
        }

        let table = self.read_metadata(grid, header_row);
        let mut rows = Vec::new();
        let mut row = header_row + 1;
        while !grid.is_blank_row(row) {
            rows.push(self.read_row(grid, row, &table.name));
            row += 1;
        }

        Ok(MappingSheet { table, rows })
    }

    fn read_metadata(&self, grid: &Grid, header_row: usize) -> TableMetadata {
        let name = match self
            .table
            .column_for(self.from, LogicalField::TargetTable)
            .map(|e| e.placement)
        {
            Ok(Placement::Cell { row, col }) => grid
                .cell(row as usize, usize::from(col))
                .to_string(),
            _ => String::new(),
        };

        let value_col = usize::from(layout::METADATA_VALUE_COL);
        let text = |row: u32| {
            let value = grid.cell(row as usize, value_col);
            (!value.trim().is_empty()).then(|| value.to_string())
        };

        let table_options = text(layout::OPTIONS_ROW).or_else(|| {
            let above = grid.cell(header_row.checked_sub(1)?, 0);
            let prefix_len = layout::INLINE_OPTIONS_PREFIX.len();
            above
                .get(..prefix_len)
                .filter(|p| p.eq_ignore_ascii_case(layout::INLINE_OPTIONS_PREFIX))
                .map(|_| above[prefix_len..].trim().to_string())
                .filter(|o| !o.is_empty())
        });

        let notes = if normalize_header(grid.cell(layout::NOTES_ROW as usize, 0))
            == normalize_header(layout::NOTES_LABEL)
        {
            grid.cell(layout::NOTES_ROW as usize, value_col)
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(|line| ResolutionWarning::Carried(line.to_string()))
                .collect()
        } else {
            Vec::new()
        };

        TableMetadata {
            name,
            description: text(layout::DESCRIPTION_ROW),
            table_options,
            sources: read_dependencies(grid, header_row),
            notes,
        }
    }

    fn read_row(&self, grid: &Grid, row: usize, table_name: &str) -> ResolvedMappingRow {
        let mut resolved = ResolvedMappingRow {
            target_table: table_name.to_string(),
            ..ResolvedMappingRow::default()
        };

        for entry in self.table.entries(self.from) {
            let Placement::Column(col) = entry.placement else {
                continue;
            };
            let Ok(target) = self.table.column_for(self.to, entry.field) else {
                if !entry.field.is_optional_legacy() {
                    warn!("Field {} has no place in {}", entry.field, self.to);
                }
                debug!(
                    "Dropping legacy field {} from row {}",
                    entry.field,
                    row + 1
                );
                continue;
            };
            if target.transform == Transform::DeriveDefault {
                debug!("Field {} keeps its default in {}", entry.field, self.to);
                continue;
            }
            resolved.set_field_text(entry.field, grid.cell(row, usize::from(col)));
        }

        if resolved.has_warnings() {
            warn!(
                "Row {} of '{table_name}' has unreadable legacy values",
                row + 1
            );
        }
        resolved
    }
}

/// Sourcing dependency block between the metadata and the table header
fn read_dependencies(grid: &Grid, header_row: usize) -> Vec<SourceDependency> {
    let Some(start) = (0..header_row).find(|&r| {
        normalize_header(grid.cell(r, 0)) == normalize_header(layout::DEPENDENCY_HEADERS[0])
    }) else {
        return Vec::new();
    };

    let column_of = |caption: &str| {
        let wanted = normalize_header(caption);
        (0..32).find(|&c| normalize_header(grid.cell(start, c)) == wanted)
    };
    let database = column_of(layout::DEPENDENCY_HEADERS[1]);
    let table = column_of(layout::DEPENDENCY_HEADERS[2]);
    let column = column_of(layout::DEPENDENCY_HEADERS[3]);
    let read = |row: usize, col: Option<usize>| {
        col.map(|c| grid.cell(row, c).to_string()).unwrap_or_default()
    };

    let mut sources = Vec::new();
    let mut row = start + 1;
    while row < header_row && !grid.is_blank_row(row) {
        let dependency = SourceDependency {
            database: read(row, database),
            table: read(row, table),
            column: read(row, column),
        };
        if dependency != SourceDependency::default() {
            sources.push(dependency);
        }
        row += 1;
    }
    sources
}
