//! Integration tests for the legacy upgrader

mod helpers;

use calamine::{Data, Reader, Xlsx, open_workbook};
use dezmap_core::error::MappingError;
use dezmap_core::types::{LogicalField, ResolutionWarning, SourcingKind, TemplateVersion};
use dezmap_service::config::ConverterConfig;
use dezmap_service::mapping_table::{ColumnMappingTable, layout};
use dezmap_service::service::MappingService;
use dezmap_service::upgrader::LegacyUpgrader;
use helpers::legacy_workbook::{create_legacy_workbook, garbled_rows, orders_rows};
use helpers::fixture;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn upgrader() -> LegacyUpgrader {
    LegacyUpgrader::new(ColumnMappingTable::builtin().unwrap())
}

#[test]
fn test_upgrade_preserves_legacy_values() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("Orders.xlsx");
    create_legacy_workbook(&old, &orders_rows()).unwrap();

    let document = upgrader().upgrade(&old).unwrap();
    assert_eq!(document.sheets.len(), 1);

    let sheet = &document.sheets[0];
    assert_eq!(sheet.table.name, "Orders");
    assert_eq!(sheet.table.description.as_deref(), Some("Customer orders"));
    assert_eq!(
        sheet.table.table_options.as_deref(),
        Some("PARTITION BY DATE(order_ts)")
    );
    assert_eq!(sheet.table.sources.len(), 1);
    assert_eq!(sheet.table.sources[0].database, "erp");
    assert_eq!(sheet.rows.len(), 3);

    let legacy = orders_rows();
    for (row, cells) in sheet.rows.iter().zip(&legacy) {
        assert_eq!(row.target_table, "Orders");
        assert_eq!(row.target_column, cells[1]);
        assert_eq!(row.data_type, cells[3]);
        assert_eq!(row.source_table.as_deref().unwrap_or_default(), cells[6]);
        assert_eq!(row.source_column.as_deref().unwrap_or_default(), cells[7]);
        assert_eq!(row.derivation.as_deref().unwrap_or_default(), cells[8]);
        assert_eq!(row.staging_table.as_deref().unwrap_or_default(), cells[9]);
        assert_eq!(row.defaults.value, cells[11]);
        assert_eq!(row.defaults.record_second, cells[13]);
        assert!(row.warnings.is_empty());
    }

    let order_id = &sheet.rows[0];
    assert_eq!(order_id.ordinal, Some(1));
    assert!(order_id.is_primary_key);
    assert_eq!(order_id.nullable, Some(false));
    assert_eq!(order_id.sourcing, Some(SourcingKind::Sourced));

    let customer_id = &sheet.rows[1];
    assert!(customer_id.is_foreign_key);
    assert_eq!(customer_id.sourcing, Some(SourcingKind::Derived));
}

#[test]
fn test_upgrade_leaves_new_fields_empty() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("Orders.xlsx");
    create_legacy_workbook(&old, &orders_rows()).unwrap();

    let document = upgrader().upgrade(&old).unwrap();
    for row in document.rows() {
        assert!(!row.is_clustering_key);
        assert!(!row.is_partition_key);
        assert_eq!(row.referenced_dimension, None);
    }
}

#[test]
fn test_upgrade_keeps_cells_as_written() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("Orders.xlsx");
    let mut rows = orders_rows();
    rows[0][4] = "PK";
    rows[0][10] = "";
    rows[1][10] = "x";
    create_legacy_workbook(&old, &rows).unwrap();

    let document = upgrader().upgrade(&old).unwrap();
    let order_id = &document.sheets[0].rows[0];
    assert!(order_id.is_primary_key);
    assert_eq!(order_id.nullable, None);
    assert!(order_id.warnings.is_empty());
    assert_eq!(document.sheets[0].rows[1].nullable, Some(false));

    let service = MappingService::new(ConverterConfig::default()).unwrap();
    let written = service.upgrade(&old).unwrap();
    let mut workbook: Xlsx<_> = open_workbook(&written).unwrap();
    let range = workbook
        .worksheet_range("Transformation - Sourcing (1)")
        .unwrap();
    let cell = |row: u32, col: u32| match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        _ => String::new(),
    };

    let header = layout::table_header_row(1);
    assert_eq!(cell(header + 1, 4), "PK");
    assert_eq!(cell(header + 1, 10), "");
    assert_eq!(cell(header + 2, 10), "x");
    assert_eq!(cell(header + 3, 10), "N");
}

#[test]
fn test_garbled_values_flag_the_row() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("Garbled.xlsx");
    create_legacy_workbook(&old, &garbled_rows()).unwrap();

    let document = upgrader().upgrade(&old).unwrap();
    let row = &document.sheets[0].rows[0];
    assert_eq!(row.target_column, "order_id");
    assert_eq!(row.source_table.as_deref(), Some("erp.orders"));
    assert_eq!(
        row.warnings,
        vec![
            ResolutionWarning::UnreadableLegacyValue {
                field: LogicalField::Keys,
                value: "PRIMRY KEY?".to_string(),
            },
            ResolutionWarning::UnreadableLegacyValue {
                field: LogicalField::NotNull,
                value: "maybe".to_string(),
            },
        ]
    );
}

#[test]
fn test_service_writes_updated_document() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("Orders.xlsx");
    create_legacy_workbook(&old, &orders_rows()).unwrap();
    let before = std::fs::read(&old).unwrap();

    let service = MappingService::new(ConverterConfig::default()).unwrap();
    let written = service.upgrade(&old).unwrap();
    assert_eq!(written, dir.path().join("Orders_UPDATED.xlsx"));
    assert_eq!(std::fs::read(&old).unwrap(), before);

    let mut workbook: Xlsx<_> = open_workbook(&written).unwrap();
    let range = workbook
        .worksheet_range("Transformation - Sourcing (1)")
        .unwrap();
    let cell = |row: u32, col: u32| match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        Some(Data::Float(f)) => f.to_string(),
        _ => String::new(),
    };

    assert_eq!(cell(1, 1), TemplateVersion::CURRENT.label());
    assert_eq!(cell(4, 1), "PARTITION BY DATE(order_ts)");
    let header = layout::table_header_row(1);
    assert_eq!(cell(header, 9), "Referenced Dimension");
    assert_eq!(cell(header + 1, 1), "order_id");
    assert_eq!(cell(header + 1, 6), "erp.orders");
    assert_eq!(cell(header + 1, 9), "");
    assert_eq!(cell(header + 1, 14), "");
    assert_eq!(cell(header + 1, 16), "stg_orders");
}

#[test]
fn test_current_layout_is_a_format_mismatch() {
    let dir = TempDir::new().unwrap();
    let service = MappingService::new(ConverterConfig::default())
        .unwrap()
        .with_output_dir(dir.path());
    let current = service
        .convert(&fixture("orders.dez"), &["Orders".to_string()])
        .unwrap();

    match upgrader().upgrade(&current).unwrap_err() {
        MappingError::FormatMismatch { message, sheet } => {
            assert!(message.contains("column J"));
            assert_eq!(sheet.as_deref(), Some("Transformation - Sourcing (1)"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_not_a_workbook() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("notes.xlsx");
    std::fs::write(&old, "plain text").unwrap();

    assert!(matches!(
        upgrader().upgrade(&old),
        Err(MappingError::FormatMismatch { sheet: None, .. })
    ));
}

#[test]
fn test_workbook_without_mapping_sheets() {
    let dir = TempDir::new().unwrap();
    let old = dir.path().join("other.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    workbook.add_worksheet().write(0, 0, "unrelated").unwrap();
    workbook.save(&old).unwrap();

    let err = upgrader().upgrade(&old).unwrap_err();
    assert!(matches!(err, MappingError::FormatMismatch { .. }));
    assert!(err.to_string().contains("Transformation - Sourcing"));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        upgrader().upgrade(&dir.path().join("absent.xlsx")),
        Err(MappingError::Io(_))
    ));
}
