use super::super::{Styles, xlsx_error};
use crate::mapping_table::layout;
use dezmap_core::error::Result;
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};

/// One line of the document's version history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionControlEntry {
    /// Document version
    pub version: String,
    /// Change date as text
    pub date: String,
    /// Change reference
    pub change_reference: String,
    /// Change description
    pub description: String,
    /// Author
    pub who_by: String,
}

impl Default for VersionControlEntry {
    fn default() -> Self {
        Self {
            version: "v0.1".to_string(),
            date: String::new(),
            change_reference: "-".to_string(),
            description: "Initial Version - Automated".to_string(),
            who_by: "Automated".to_string(),
        }
    }
}

impl VersionControlEntry {
    fn cells(&self) -> [&str; 5] {
        [
            &self.version,
            &self.date,
            &self.change_reference,
            &self.description,
            &self.who_by,
        ]
    }
}

/// Write the `Version Control` sheet
pub(in crate::writer) fn write_version_control(
    workbook: &mut Workbook,
    entry: &VersionControlEntry,
    styles: &Styles,
) -> Result<()> {
    let worksheet = workbook
        .add_worksheet()
        .set_name(layout::VERSION_CONTROL_SHEET)
        .map_err(xlsx_error)?;

    worksheet
        .write_string_with_format(
            layout::TITLE_ROW,
            0,
            layout::VERSION_CONTROL_SHEET,
            &styles.title,
        )
        .map_err(xlsx_error)?;

    let header_row = layout::VERSION_CONTROL_HEADER_ROW;
    let mut col = layout::VERSION_CONTROL_FIRST_COL;
    for (caption, value) in layout::VERSION_CONTROL_HEADERS.iter().zip(entry.cells()) {
        worksheet
            .write_string_with_format(header_row, col, *caption, &styles.header)
            .map_err(xlsx_error)?;
        if value.is_empty() {
            worksheet
                .write_blank(header_row + 1, col, &styles.value)
                .map_err(xlsx_error)?;
        } else {
            worksheet
                .write_string_with_format(header_row + 1, col, value, &styles.value)
                .map_err(xlsx_error)?;
        }
        worksheet.set_column_width(col, 22).map_err(xlsx_error)?;
        col += 1;
    }
    worksheet
        .set_column_width(layout::VERSION_CONTROL_FIRST_COL + 3, 40)
        .map_err(xlsx_error)?;

    Ok(())
}
