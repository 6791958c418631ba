//! Integration tests for the column mapping table

use dezmap_core::error::MappingError;
use dezmap_core::types::{LogicalField, TemplateVersion};
use dezmap_service::mapping_table::{ColumnMappingEntry, ColumnMappingTable, Placement};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;

fn builtin_layouts() -> BTreeMap<TemplateVersion, Vec<ColumnMappingEntry>> {
    let table = ColumnMappingTable::builtin().unwrap();
    TemplateVersion::ALL
        .into_iter()
        .map(|version| (version, table.entries(version).to_vec()))
        .collect()
}

fn self_check_message(layouts: BTreeMap<TemplateVersion, Vec<ColumnMappingEntry>>) -> String {
    match ColumnMappingTable::from_layouts(layouts) {
        Err(MappingError::SelfCheck(message)) => message,
        other => panic!("expected a self-check failure, got {other:?}"),
    }
}

#[test]
fn test_builtin_table_passes_self_check() {
    let table = ColumnMappingTable::builtin().unwrap();
    for version in TemplateVersion::ALL {
        for field in LogicalField::ENGINE_EMITTED {
            assert!(
                table.column_for(version, field).is_ok(),
                "{field} missing in {version}"
            );
        }
    }
}

#[test]
fn test_layouts_differ_at_column_j() {
    let table = ColumnMappingTable::builtin().unwrap();
    let legacy = table.column_for(TemplateVersion::LEGACY, LogicalField::StagingTable).unwrap();
    let current = table
        .column_for(TemplateVersion::CURRENT, LogicalField::ReferencedDimension)
        .unwrap();
    assert_eq!(legacy.column(), Some(9));
    assert_eq!(current.column(), Some(9));

    let clustering = table
        .column_for(TemplateVersion::LEGACY, LogicalField::Clustering)
        .unwrap();
    assert_eq!(clustering.placement, Placement::Absent);
}

#[test]
fn test_legacy_comments_unknown_to_current_layout() {
    let table = ColumnMappingTable::builtin().unwrap();
    assert!(table.column_for(TemplateVersion::LEGACY, LogicalField::LegacyComments).is_ok());
    assert!(matches!(
        table.column_for(TemplateVersion::CURRENT, LogicalField::LegacyComments),
        Err(MappingError::UnknownField {
            version: TemplateVersion::V1_11,
            field: LogicalField::LegacyComments,
        })
    ));
}

#[test]
fn test_signature_skips_optional_legacy_columns() {
    let table = ColumnMappingTable::builtin().unwrap();
    let signature = table.signature(TemplateVersion::LEGACY);
    assert_eq!(signature.first(), Some(&(0, "#")));
    assert!(signature.iter().all(|(_, header)| *header != "Comments"));
    assert_eq!(table.signature(TemplateVersion::CURRENT).len(), 18);
}

#[test]
fn test_missing_engine_field_fails() {
    let mut layouts = builtin_layouts();
    if let Some(entries) = layouts.get_mut(&TemplateVersion::V1_11) {
        entries.retain(|e| e.field != LogicalField::Derivation);
    }
    let message = self_check_message(layouts);
    assert!(message.contains("Derivation"));
    assert!(message.starts_with("1-11"));
}

#[test]
fn test_shared_column_fails() {
    let mut layouts = builtin_layouts();
    if let Some(entries) = layouts.get_mut(&TemplateVersion::V1_7) {
        for entry in entries.iter_mut() {
            if entry.field == LogicalField::NotNull {
                entry.placement = Placement::Column(3);
            }
        }
    }
    assert!(self_check_message(layouts).contains("shares its placement"));
}

#[test]
fn test_empty_header_fails() {
    let mut layouts = builtin_layouts();
    if let Some(entries) = layouts.get_mut(&TemplateVersion::V1_11) {
        for entry in entries.iter_mut() {
            if entry.field == LogicalField::ReviewNotes {
                entry.header = " ";
            }
        }
    }
    assert!(self_check_message(layouts).contains("no header caption"));
}

#[test]
fn test_missing_version_fails() {
    let mut layouts = builtin_layouts();
    layouts.remove(&TemplateVersion::V1_7);
    assert!(self_check_message(layouts).contains("no layout"));
}
