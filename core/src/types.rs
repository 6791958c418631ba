//! Core type definitions for parsed models and mapping documents

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// User-defined properties in document order (`name -> value`)
pub type Properties = IndexMap<String, String>;

/// Stable identifier of an entity inside one parsed model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub usize);

/// Stable identifier of an attribute: owning entity plus position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeId {
    /// Owning entity
    pub entity: EntityId,
    /// Zero-based position inside the entity
    pub index: usize,
}

/// Normalized model produced by the schema reader
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaModel {
    /// Entities in document order
    pub entities: Vec<Entity>,
    /// Diagrams and the entities they show
    pub diagrams: Vec<Diagram>,
    /// Warnings that could not be attached to a key (e.g. relationships on unknown children)
    pub warnings: Vec<ResolutionWarning>,
}

impl SchemaModel {
    /// Look up an entity by its stable identifier
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    /// Look up an entity by name (first match in document order)
    #[must_use]
    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Look up an attribute by its stable identifier
    #[must_use]
    pub fn attribute(&self, id: AttributeId) -> Option<&Attribute> {
        self.entity(id.entity)?.attributes.get(id.index)
    }

    /// Entity names in document order
    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.name.as_str())
    }

    /// Total number of attributes across all entities
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.entities.iter().map(|e| e.attributes.len()).sum()
    }
}

/// A table-like object of the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    /// Stable identifier
    pub id: EntityId,
    /// Identifier used by the source document
    pub source_id: Option<String>,
    /// Entity name
    pub name: String,
    /// Business description
    pub description: Option<String>,
    /// Owning schema
    pub schema: Option<String>,
    /// Attributes in document order
    pub attributes: Vec<Attribute>,
    /// Keys in document order (primary first, then unique, then foreign)
    pub keys: Vec<Key>,
    /// Entity-level user-defined properties
    pub properties: Properties,
}

impl Entity {
    /// Keys of a given kind
    pub fn keys_of(&self, kind: KeyKind) -> impl Iterator<Item = &Key> {
        self.keys.iter().filter(move |k| k.kind == kind)
    }

    /// Whether the attribute is a member of any key of the given kind
    #[must_use]
    pub fn is_member_of(&self, attribute: AttributeId, kind: KeyKind) -> bool {
        self.keys_of(kind).any(|k| k.members.contains(&attribute))
    }

    /// Look up an attribute by name
    #[must_use]
    pub fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A column of an entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    /// Stable identifier
    pub id: AttributeId,
    /// Identifier used by the source document
    pub source_id: Option<String>,
    /// Column name
    pub name: String,
    /// Description
    pub description: Option<String>,
    /// Declared data type, verbatim
    pub data_type: String,
    /// `Some(false)` for a declared NOT NULL, `Some(true)` for declared nullable, `None` if undeclared
    pub nullable: Option<bool>,
    /// 1-based position inside the entity
    pub ordinal: u32,
    /// Attribute-level user-defined properties
    pub properties: Properties,
}

/// Kind of key constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyKind {
    /// Primary key
    Primary,
    /// Foreign key to another entity
    Foreign,
    /// Any other constraint (unique, alternate)
    Other,
}

/// A named key grouping attributes of one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Key {
    /// Constraint name
    pub name: String,
    /// Kind
    pub kind: KeyKind,
    /// Member attributes in declaration order
    pub members: Vec<AttributeId>,
    /// Target of a foreign key
    pub reference: Option<KeyReference>,
    /// Problems met while resolving the key
    pub warnings: Vec<ResolutionWarning>,
}

/// Target of a foreign key, resolved after the whole document is read
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyReference {
    /// Identifier of the parent entity as written in the document
    pub target_source_id: String,
    /// Resolved parent entity, `None` when dangling
    pub target_entity: Option<EntityId>,
    /// Resolved parent entity name
    pub target_name: Option<String>,
    /// Name of the parent's primary key, if it has one
    pub target_key: Option<String>,
}

impl KeyReference {
    /// Whether the target entity could not be found
    #[must_use]
    pub fn is_dangling(&self) -> bool {
        self.target_entity.is_none()
    }
}

/// A diagram of the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagram {
    /// Diagram name
    pub name: String,
    /// Entities placed on the diagram
    pub entities: Vec<EntityId>,
}

/// Non-fatal data-quality finding attached to a key or row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionWarning {
    /// Foreign key whose parent entity is not in the document
    DanglingForeignKey {
        /// Key name
        key: String,
        /// Parent identifier that did not resolve
        target: String,
    },
    /// Key member that does not belong to the key's entity
    UnresolvedKeyMember {
        /// Key name
        key: String,
        /// Attribute identifier that did not resolve
        member: String,
    },
    /// Data type missing from the configured type table
    UnrecognizedType {
        /// Raw type text
        raw: String,
    },
    /// No explicit or inferred sourcing
    UnresolvedSourcing,
    /// Several non-empty derivation properties were present
    ConflictingDerivation {
        /// Property that was used
        chosen: String,
        /// Properties that were ignored
        ignored: Vec<String>,
    },
    /// Legacy cell content that could not be interpreted
    UnreadableLegacyValue {
        /// Field the value belonged to
        field: LogicalField,
        /// Raw cell text
        value: String,
    },
    /// Review note carried over from an existing document
    Carried(String),
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingForeignKey { key, target } => {
                write!(f, "Foreign key '{key}' references unknown entity '{target}'")
            }
            Self::UnresolvedKeyMember { key, member } => {
                write!(f, "Key '{key}' lists attribute '{member}' outside its entity")
            }
            Self::UnrecognizedType { raw } => {
                write!(f, "Unrecognized data type '{raw}' kept as declared")
            }
            Self::UnresolvedSourcing => write!(f, "Sourcing not resolved"),
            Self::ConflictingDerivation { chosen, ignored } => write!(
                f,
                "Derivation taken from '{chosen}', ignored {}",
                ignored.join(", ")
            ),
            Self::UnreadableLegacyValue { field, value } => {
                write!(f, "Unreadable legacy value '{value}' in {field}")
            }
            Self::Carried(note) => f.write_str(note),
        }
    }
}

/// Whether a target column is filled from a source or derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourcingKind {
    /// Copied from a source column
    Sourced,
    /// Computed or looked up
    Derived,
}

impl SourcingKind {
    /// Label written to the mapping document
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Sourced => "Sourced",
            Self::Derived => "Derived",
        }
    }
}

/// Default values written for a column (value, first and second default record)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultValues {
    /// `Default Values`
    pub value: String,
    /// `Default Records`
    pub record: String,
    /// `Default Records (2)`
    pub record_second: String,
}

impl DefaultValues {
    /// Build from three literals
    #[must_use]
    pub fn new(value: &str, record: &str, record_second: &str) -> Self {
        Self {
            value: value.to_string(),
            record: record.to_string(),
            record_second: record_second.to_string(),
        }
    }
}

/// One output row of a mapping document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedMappingRow {
    /// Position of the column in its table
    pub ordinal: Option<u32>,
    /// Target table
    pub target_table: String,
    /// Target column
    pub target_column: String,
    /// Column description
    pub description: Option<String>,
    /// Source table(s), `None` when unresolved
    pub source_table: Option<String>,
    /// Source column(s), `None` when unresolved
    pub source_column: Option<String>,
    /// Target data type
    pub data_type: String,
    /// Whether the target column accepts nulls; `None` when an upgraded cell was blank
    pub nullable: Option<bool>,
    /// Member of a primary key
    pub is_primary_key: bool,
    /// Member of a foreign key
    pub is_foreign_key: bool,
    /// Clustering column
    pub is_clustering_key: bool,
    /// Partitioning column
    pub is_partition_key: bool,
    /// Sourced or derived
    pub sourcing: Option<SourcingKind>,
    /// Derivation or business rule text
    pub derivation: Option<String>,
    /// Entity referenced through a foreign key
    pub referenced_dimension: Option<String>,
    /// Default values
    pub defaults: DefaultValues,
    /// Staging table or static dataset
    pub staging_table: Option<String>,
    /// Data-quality findings
    pub warnings: Vec<ResolutionWarning>,
    /// Original text of flag cells read from an existing document
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub cell_text: BTreeMap<LogicalField, String>,
}

impl ResolvedMappingRow {
    /// Whether neither a source column nor a derivation is known
    #[must_use]
    pub fn is_sourcing_unresolved(&self) -> bool {
        self.source_column.as_deref().is_none_or(str::is_empty)
            && self.derivation.as_deref().is_none_or(str::is_empty)
    }

    /// Whether any warning is attached
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Whether the data type was not recognized
    #[must_use]
    pub fn has_unrecognized_type(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ResolutionWarning::UnrecognizedType { .. }))
    }
}

/// Supported mapping document layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TemplateVersion {
    /// Legacy layout (`Mapping_1-7`)
    #[serde(rename = "1-7")]
    V1_7,
    /// Current layout (`mapping_1-11`)
    #[serde(rename = "1-11")]
    V1_11,
}

impl TemplateVersion {
    /// Layout read by the upgrader
    pub const LEGACY: Self = Self::V1_7;
    /// Layout produced by conversions and upgrades
    pub const CURRENT: Self = Self::V1_11;
    /// Every supported layout
    pub const ALL: [Self; 2] = [Self::V1_7, Self::V1_11];

    /// Short label (`1-7`, `1-11`)
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::V1_7 => "1-7",
            Self::V1_11 => "1-11",
        }
    }
}

impl fmt::Display for TemplateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TemplateVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().trim_start_matches(['v', 'V']).replace('.', "-").as_str() {
            "1-7" => Ok(Self::V1_7),
            "1-11" => Ok(Self::V1_11),
            other => Err(format!("unsupported template version '{other}'")),
        }
    }
}

/// Logical fields of a mapping row, independent of any physical layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogicalField {
    /// `#`
    Ordinal,
    /// Table name metadata cell
    TargetTable,
    /// Attribute name
    AttributeName,
    /// Attribute description
    AttributeDescription,
    /// Data type
    DataType,
    /// Primary/foreign key designation
    Keys,
    /// Sourced or derived
    SourcedDerived,
    /// Source table
    SourceTable,
    /// Source attribute
    SourceAttribute,
    /// Derivation / business rule
    Derivation,
    /// Referenced dimension
    ReferencedDimension,
    /// Not null flag
    NotNull,
    /// Default value
    DefaultValue,
    /// First default record
    DefaultRecord,
    /// Second default record
    DefaultRecordSecond,
    /// Clustering flag
    Clustering,
    /// Partitioning flag
    Partitioning,
    /// Staging table / static dataset name
    StagingTable,
    /// Review notes written from row warnings
    ReviewNotes,
    /// Free-text comments of the legacy layout
    LegacyComments,
}

impl LogicalField {
    /// Fields the derivation engine produces for every row
    pub const ENGINE_EMITTED: [Self; 18] = [
        Self::Ordinal,
        Self::TargetTable,
        Self::AttributeName,
        Self::AttributeDescription,
        Self::DataType,
        Self::Keys,
        Self::SourcedDerived,
        Self::SourceTable,
        Self::SourceAttribute,
        Self::Derivation,
        Self::ReferencedDimension,
        Self::NotNull,
        Self::DefaultValue,
        Self::DefaultRecord,
        Self::DefaultRecordSecond,
        Self::Clustering,
        Self::Partitioning,
        Self::ReviewNotes,
    ];

    /// Fields that exist only in legacy layouts and may be dropped on upgrade
    #[must_use]
    pub fn is_optional_legacy(self) -> bool {
        matches!(self, Self::LegacyComments)
    }

    /// Stable name used in configuration and messages
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Ordinal => "Ordinal",
            Self::TargetTable => "TargetTable",
            Self::AttributeName => "AttributeName",
            Self::AttributeDescription => "AttributeDescription",
            Self::DataType => "DataType",
            Self::Keys => "Keys",
            Self::SourcedDerived => "SourcedDerived",
            Self::SourceTable => "SourceTable",
            Self::SourceAttribute => "SourceAttribute",
            Self::Derivation => "Derivation",
            Self::ReferencedDimension => "ReferencedDimension",
            Self::NotNull => "NotNull",
            Self::DefaultValue => "DefaultValue",
            Self::DefaultRecord => "DefaultRecord",
            Self::DefaultRecordSecond => "DefaultRecordSecond",
            Self::Clustering => "Clustering",
            Self::Partitioning => "Partitioning",
            Self::StagingTable => "StagingTable",
            Self::ReviewNotes => "ReviewNotes",
            Self::LegacyComments => "LegacyComments",
        }
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One sourcing dependency of a target table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDependency {
    /// Source database
    pub database: String,
    /// Source table or dataset
    pub table: String,
    /// Source column
    pub column: String,
}

/// Metadata block of a mapping sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableMetadata {
    /// Target table name
    pub name: String,
    /// Table description
    pub description: Option<String>,
    /// Partition/cluster DDL options
    pub table_options: Option<String>,
    /// Sourcing dependencies
    pub sources: Vec<SourceDependency>,
    /// Findings about the table rather than one of its rows
    pub notes: Vec<ResolutionWarning>,
}

/// One target table of a mapping document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MappingSheet {
    /// Metadata block
    pub table: TableMetadata,
    /// Rows in output order
    pub rows: Vec<ResolvedMappingRow>,
}

/// A complete mapping document, one sheet per target table
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MappingDocument {
    /// Sheets in output order
    pub sheets: Vec<MappingSheet>,
}

impl MappingDocument {
    /// Group rows by target table, keeping first-seen table order and row order
    ///
    /// Rows of one table are gathered into its sheet even when the input
    /// interleaves tables.
    #[must_use]
    pub fn from_rows(rows: &[ResolvedMappingRow]) -> Self {
        let mut sheets: IndexMap<&str, MappingSheet> = IndexMap::new();
        for row in rows {
            sheets
                .entry(row.target_table.as_str())
                .or_insert_with(|| MappingSheet {
                    table: TableMetadata {
                        name: row.target_table.clone(),
                        ..TableMetadata::default()
                    },
                    rows: Vec::new(),
                })
                .rows
                .push(row.clone());
        }
        Self {
            sheets: sheets.into_values().collect(),
        }
    }

    /// All rows across sheets in output order
    pub fn rows(&self) -> impl Iterator<Item = &ResolvedMappingRow> {
        self.sheets.iter().flat_map(|s| s.rows.iter())
    }

    /// Number of rows across sheets
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.sheets.iter().map(|s| s.rows.len()).sum()
    }
}
