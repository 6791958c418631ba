use super::super::cast::{usize_to_u16_column, usize_to_u32_row};
use super::super::features::WriterFeatures;
use super::super::template::StyleTemplate;
use super::super::{Styles, xlsx_error};
use crate::mapping_table::{ColumnMappingTable, Placement, layout};
use dezmap_core::error::Result;
use dezmap_core::types::{LogicalField, MappingSheet, ResolvedMappingRow, TemplateVersion};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

/// Everything a table sheet is rendered from
pub(in crate::writer) struct SheetContext<'a> {
    pub version: TemplateVersion,
    pub table: &'a ColumnMappingTable,
    pub template: &'a StyleTemplate,
    pub styles: &'a Styles,
    pub features: WriterFeatures,
}

/// Sanitize sheet name for the workbook
pub(in crate::writer) fn sanitize_sheet_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '\\' | '/' | '?' | '*' | '[' | ']' | ':'))
        .take(31)
        .collect()
}

fn write_text(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    text: &str,
    format: &Format,
) -> Result<()> {
    if text.is_empty() {
        worksheet.write_blank(row, col, format).map_err(xlsx_error)?;
    } else {
        worksheet
            .write_string_with_format(row, col, text, format)
            .map_err(xlsx_error)?;
    }
    Ok(())
}

/// Write one `Transformation - Sourcing (n)` sheet
pub(in crate::writer) fn write_table_sheet(
    workbook: &mut Workbook,
    position: usize,
    sheet: &MappingSheet,
    ctx: &SheetContext<'_>,
) -> Result<()> {
    let name = sanitize_sheet_name(&layout::sheet_name(position));
    let worksheet = workbook.add_worksheet().set_name(&name).map_err(xlsx_error)?;
    let styles = ctx.styles;

    write_text(worksheet, layout::TITLE_ROW, 0, &ctx.template.title, &styles.title)?;
    write_text(worksheet, layout::VERSION_ROW, 0, layout::VERSION_LABEL, &styles.label)?;
    write_text(
        worksheet,
        layout::VERSION_ROW,
        layout::METADATA_VALUE_COL,
        ctx.version.label(),
        &styles.value,
    )?;

    write_metadata(worksheet, sheet, ctx)?;
    write_dependencies(worksheet, sheet, styles)?;

    let header_row = layout::table_header_row(sheet.table.sources.len());
    let columns = ctx.table.columns(ctx.version);
    for (col, entry) in &columns {
        write_text(worksheet, header_row, *col, entry.header, &styles.header)?;
        worksheet
            .set_column_width(*col, ctx.template.column_width(*col))
            .map_err(xlsx_error)?;
    }

    let with_rules = ctx.features.contains(WriterFeatures::ROW_STYLING);
    for (offset, row) in sheet.rows.iter().enumerate() {
        let excel_row = header_row + 1 + usize_to_u32_row(offset)?;
        write_row(worksheet, excel_row, row, &columns, ctx, with_rules)?;
    }

    let last_col = columns.last().map_or(0, |(c, _)| *c);
    if ctx.features.contains(WriterFeatures::FREEZE_HEADERS) {
        worksheet
            .set_freeze_panes(header_row + 1, 0)
            .map_err(xlsx_error)?;
    }
    if ctx.features.contains(WriterFeatures::ADD_FILTERS) && !sheet.rows.is_empty() {
        let last_row = header_row + usize_to_u32_row(sheet.rows.len())?;
        worksheet
            .autofilter(header_row, 0, last_row, last_col)
            .map_err(xlsx_error)?;
    }

    debug!(
        "Wrote sheet '{name}' for table '{}' with {} rows",
        sheet.table.name,
        sheet.rows.len()
    );
    Ok(())
}

fn write_metadata(
    worksheet: &mut Worksheet,
    sheet: &MappingSheet,
    ctx: &SheetContext<'_>,
) -> Result<()> {
    let styles = ctx.styles;
    let value_col = layout::METADATA_VALUE_COL;

    let entry = ctx.table.column_for(ctx.version, LogicalField::TargetTable)?;
    if let Placement::Cell { row, col } = entry.placement {
        if col > 0 {
            write_text(worksheet, row, col - 1, entry.header, &styles.label)?;
        }
        write_text(worksheet, row, col, &sheet.table.name, &styles.value)?;
    }

    let description = sheet.table.description.as_deref().unwrap_or_default();
    write_text(worksheet, layout::DESCRIPTION_ROW, 0, layout::DESCRIPTION_LABEL, &styles.label)?;
    write_text(worksheet, layout::DESCRIPTION_ROW, value_col, description, &styles.value)?;

    let options = sheet.table.table_options.as_deref().unwrap_or_default();
    write_text(worksheet, layout::OPTIONS_ROW, 0, layout::OPTIONS_LABEL, &styles.label)?;
    write_text(worksheet, layout::OPTIONS_ROW, value_col, options, &styles.value)?;

    let notes = sheet
        .table
        .notes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    write_text(worksheet, layout::NOTES_ROW, 0, layout::NOTES_LABEL, &styles.label)?;
    write_text(worksheet, layout::NOTES_ROW, value_col, &notes, &styles.value)?;
    Ok(())
}

fn write_dependencies(worksheet: &mut Worksheet, sheet: &MappingSheet, styles: &Styles) -> Result<()> {
    let header_row = layout::DEPENDENCY_HEADER_ROW;
    for (index, caption) in layout::DEPENDENCY_HEADERS.iter().enumerate() {
        write_text(worksheet, header_row, usize_to_u16_column(index)?, caption, &styles.header)?;
    }

    for (index, source) in sheet.table.sources.iter().enumerate() {
        let row = header_row + 1 + usize_to_u32_row(index)?;
        worksheet
            .write_number_with_format(row, 0, u32::try_from(index + 1).unwrap_or(u32::MAX), &styles.data)
            .map_err(xlsx_error)?;
        write_text(worksheet, row, 1, &source.database, &styles.data)?;
        write_text(worksheet, row, 2, &source.table, &styles.data)?;
        write_text(worksheet, row, 3, &source.column, &styles.data)?;
    }
    Ok(())
}

fn write_row(
    worksheet: &mut Worksheet,
    excel_row: u32,
    row: &ResolvedMappingRow,
    columns: &[(u16, &crate::mapping_table::ColumnMappingEntry)],
    ctx: &SheetContext<'_>,
    with_rules: bool,
) -> Result<()> {
    for (col, entry) in columns {
        let format = ctx
            .template
            .cell_style(row, entry.field, with_rules)
            .to_format()?;

        match (entry.field, row.ordinal) {
            (LogicalField::Ordinal, Some(ordinal)) => {
                worksheet
                    .write_number_with_format(excel_row, *col, ordinal, &format)
                    .map_err(xlsx_error)?;
            }
            (field, _) => write_text(worksheet, excel_row, *col, &row.field_text(field), &format)?,
        }
    }
    Ok(())
}
