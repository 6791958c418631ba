//! Helper functions to generate legacy-layout mapping documents for testing

use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

/// Header captions of the legacy transformation table
pub const LEGACY_HEADER: [&str; 15] = [
    "#",
    "Attribute Name",
    "Attribute Description",
    "Datatype",
    "Keys",
    "Sourced/Derived",
    "Source Table",
    "Source Attribute",
    "Derivation / Business Rule",
    "StageHist Table Name",
    "Not Null",
    "Default Values",
    "Default Records",
    "Default Records (2)",
    "Comments",
];

/// Rows of the legacy `Orders` table
pub fn orders_rows() -> Vec<[&'static str; 15]> {
    vec![
        [
            "1", "order_id", "Order key", "INT64", "PRIMARY", "Sourced", "erp.orders", "id", "",
            "stg_orders", "Y", "-1", "-1", "-2", "checked by data owner",
        ],
        [
            "2", "customer_id", "Ordering customer", "INT64", "FOREIGN", "Derived", "", "",
            "Lookup of Customers.customer_id", "", "Y", "-1", "-1", "-2", "",
        ],
        [
            "3", "order_ts", "", "TIMESTAMP", "", "Sourced", "erp.orders", "created_at", "",
            "stg_orders", "N", "\"1900-01-01 00:00:00.0000\"", "\"1900-01-01 00:00:00.0000\"",
            "\"9999-12-31 23:59:59.9999\"", "",
        ],
    ]
}

/// Rows with unreadable key and not-null cells
pub fn garbled_rows() -> Vec<[&'static str; 15]> {
    vec![[
        "1", "order_id", "", "INT64", "PRIMRY KEY?", "Sourced", "erp.orders", "id", "", "", "maybe",
        "", "", "", "",
    ]]
}

/// Write a legacy (`1-7`) mapping document with one `Orders` sheet
pub fn create_legacy_workbook(
    path: &Path,
    rows: &[[&str; 15]],
) -> Result<(), Box<dyn std::error::Error>> {
    create_workbook(path, &LEGACY_HEADER, rows)
}

/// Write a mapping document with the given table header
pub fn create_workbook(
    path: &Path,
    header: &[&str],
    rows: &[[&str; 15]],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let history = workbook.add_worksheet();
    history.set_name("Version Control")?;
    history.write_with_format(3, 1, "Version", &bold)?;
    history.write(4, 1, "v0.3")?;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Transformation - Sourcing (1)")?;
    sheet.write_with_format(0, 0, "Transformation - Sourcing", &bold)?;
    sheet.write(1, 0, "Template Version")?;
    sheet.write(1, 1, "1-7")?;
    sheet.write(2, 0, "Table Name")?;
    sheet.write(2, 1, "Orders")?;
    sheet.write(3, 0, "Table Description")?;
    sheet.write(3, 1, "Customer orders")?;

    sheet.write_with_format(6, 0, "Dependency", &bold)?;
    sheet.write_with_format(6, 1, "Source Database", &bold)?;
    sheet.write_with_format(6, 2, "Table Name/Dataset Name", &bold)?;
    sheet.write_with_format(6, 3, "Source Column", &bold)?;
    sheet.write(7, 0, 1)?;
    sheet.write(7, 1, "erp")?;
    sheet.write(7, 2, "orders")?;
    sheet.write(7, 3, "id")?;

    sheet.write(8, 0, "Table options: PARTITION BY DATE(order_ts)")?;

    let header_row = 9;
    for (col, caption) in header.iter().enumerate() {
        sheet.write_with_format(header_row, u16::try_from(col)?, *caption, &bold)?;
    }
    for (offset, row) in rows.iter().enumerate() {
        let excel_row = header_row + 1 + u32::try_from(offset)?;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let col = u16::try_from(col)?;
            match value.parse::<u32>() {
                Ok(number) if col == 0 => sheet.write(excel_row, col, number)?,
                _ => sheet.write(excel_row, col, *value)?,
            };
        }
    }

    workbook.save(path)?;
    Ok(())
}
