//! Built-in column layouts of the supported template versions

use super::{ColumnMappingEntry, Placement, Transform};
use dezmap_core::types::LogicalField as F;

/// Row and column of the table-name metadata cell (`B3`)
const TABLE_NAME_CELL: Placement = Placement::Cell { row: 2, col: 1 };

fn column(field: F, col: u16, header: &'static str) -> ColumnMappingEntry {
    ColumnMappingEntry {
        field,
        placement: Placement::Column(col),
        header,
        transform: Transform::Copy,
    }
}

fn metadata(field: F, placement: Placement, header: &'static str) -> ColumnMappingEntry {
    ColumnMappingEntry {
        field,
        placement,
        header,
        transform: Transform::Copy,
    }
}

fn absent(field: F) -> ColumnMappingEntry {
    ColumnMappingEntry {
        field,
        placement: Placement::Absent,
        header: "",
        transform: Transform::DeriveDefault,
    }
}

/// Layout of `mapping_1-11`
pub(super) fn current() -> Vec<ColumnMappingEntry> {
    vec![
        metadata(F::TargetTable, TABLE_NAME_CELL, "Table Name"),
        column(F::Ordinal, 0, "#"),
        column(F::AttributeName, 1, "Attribute Name"),
        column(F::AttributeDescription, 2, "Attribute Description"),
        column(F::DataType, 3, "Datatype"),
        column(F::Keys, 4, "Keys"),
        column(F::SourcedDerived, 5, "Sourced/Derived"),
        column(F::SourceTable, 6, "Source Table"),
        column(F::SourceAttribute, 7, "Source Attribute"),
        column(F::Derivation, 8, "Derivation / Business Rule"),
        column(F::ReferencedDimension, 9, "Referenced Dimension"),
        column(F::NotNull, 10, "Not Null"),
        column(F::DefaultValue, 11, "Default Values"),
        column(F::DefaultRecord, 12, "Default Records"),
        column(F::DefaultRecordSecond, 13, "Default Records (2)"),
        column(F::Clustering, 14, "Clustering"),
        column(F::Partitioning, 15, "Partitioning"),
        column(
            F::StagingTable,
            16,
            "Staging Table Name / Static Dataset Name (xref tab)",
        ),
        column(F::ReviewNotes, 17, "Review Notes"),
    ]
}

/// Layout of `Mapping_1-7`
pub(super) fn legacy() -> Vec<ColumnMappingEntry> {
    vec![
        metadata(F::TargetTable, TABLE_NAME_CELL, "Table Name"),
        column(F::Ordinal, 0, "#"),
        column(F::AttributeName, 1, "Attribute Name"),
        column(F::AttributeDescription, 2, "Attribute Description"),
        column(F::DataType, 3, "Datatype"),
        column(F::Keys, 4, "Keys"),
        column(F::SourcedDerived, 5, "Sourced/Derived"),
        column(F::SourceTable, 6, "Source Table"),
        column(F::SourceAttribute, 7, "Source Attribute"),
        column(F::Derivation, 8, "Derivation / Business Rule"),
        column(F::StagingTable, 9, "StageHist Table Name"),
        column(F::NotNull, 10, "Not Null"),
        column(F::DefaultValue, 11, "Default Values"),
        column(F::DefaultRecord, 12, "Default Records"),
        column(F::DefaultRecordSecond, 13, "Default Records (2)"),
        column(F::LegacyComments, 14, "Comments"),
        absent(F::ReferencedDimension),
        absent(F::Clustering),
        absent(F::Partitioning),
        absent(F::ReviewNotes),
    ]
}
