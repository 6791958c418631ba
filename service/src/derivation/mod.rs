//! Defaulting and derivation engine
//!
//! Turns one attribute of the normalized model into a [`ResolvedMappingRow`]:
//! target type, nullability, key and storage flags, default values and the
//! sourcing or derivation text. Every convention comes from [`RulesConfig`];
//! the engine itself holds no state besides the compiled rules.

pub mod properties;
pub mod table_options;

use dezmap_core::config::{NamingConvention, RulesConfig};
use dezmap_core::error::{MappingError, Result};
use dezmap_core::types::{
    Attribute, DefaultValues, Entity, KeyKind, MappingDocument, MappingSheet, ResolutionWarning,
    ResolvedMappingRow, SourcingKind, TableMetadata,
};
use regex::Regex;
use std::collections::BTreeMap;
use table_options::TableOptions;
use tracing::{debug, warn};

/// Naming convention with its pattern compiled
#[derive(Debug, Clone)]
struct CompiledConvention {
    pattern: Regex,
    convention: NamingConvention,
}

/// Sourcing fields of a row
#[derive(Debug, Default)]
struct Sourcing {
    source_table: Option<String>,
    source_column: Option<String>,
    derivation: Option<String>,
    explicit_derivation: bool,
    warnings: Vec<ResolutionWarning>,
}

/// Engine resolving attributes into mapping rows
#[derive(Debug, Clone)]
pub struct DerivationEngine {
    rules: RulesConfig,
    conventions: Vec<CompiledConvention>,
}

impl DerivationEngine {
    /// Create an engine for a rule set
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Config` if a naming convention pattern is not a
    /// valid regular expression.
    pub fn new(rules: RulesConfig) -> Result<Self> {
        let conventions = rules
            .naming_conventions
            .iter()
            .map(|convention| {
                Regex::new(&convention.pattern)
                    .map(|pattern| CompiledConvention {
                        pattern,
                        convention: convention.clone(),
                    })
                    .map_err(|e| {
                        MappingError::config(format!(
                            "Invalid naming convention pattern '{}': {e}",
                            convention.pattern
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules, conventions })
    }

    /// Rules in use
    #[must_use]
    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    /// Resolve one attribute of `entity`
    #[must_use]
    pub fn resolve(&self, entity: &Entity, attribute: &Attribute) -> ResolvedMappingRow {
        let mut warnings = Vec::new();

        let is_primary_key = entity.is_member_of(attribute.id, KeyKind::Primary);
        let foreign_keys: Vec<_> = entity
            .keys_of(KeyKind::Foreign)
            .filter(|k| k.members.contains(&attribute.id))
            .collect();
        let is_foreign_key = !foreign_keys.is_empty();
        let referenced_dimension = foreign_keys
            .iter()
            .filter_map(|k| k.reference.as_ref())
            .find_map(|r| r.target_name.clone());
        for key in &foreign_keys {
            warnings.extend(
                key.warnings
                    .iter()
                    .filter(|w| matches!(w, ResolutionWarning::DanglingForeignKey { .. }))
                    .cloned(),
            );
        }

        let (data_type, type_nullable) = match self.rules.type_rule(&attribute.data_type) {
            Some(rule) => (rule.target.clone(), rule.nullable),
            None => {
                debug!(
                    "Unrecognized data type '{}' on {}.{}",
                    attribute.data_type, entity.name, attribute.name
                );
                warnings.push(ResolutionWarning::UnrecognizedType {
                    raw: attribute.data_type.clone(),
                });
                (attribute.data_type.clone(), true)
            }
        };
        let nullable = attribute.nullable.unwrap_or(type_nullable);

        let table_options = self.table_options(entity).map(TableOptions::parse);
        let is_clustering_key = self.flag_set(
            entity,
            attribute,
            &self.rules.properties.clustering,
            table_options.as_ref().is_some_and(|o| o.clusters_by(&attribute.name)),
        );
        let is_partition_key = self.flag_set(
            entity,
            attribute,
            &self.rules.properties.partitioning,
            table_options.as_ref().is_some_and(|o| o.partitions_by(&attribute.name)),
        );

        let sourcing = self.sourcing(entity, attribute);
        warnings.extend(sourcing.warnings);

        let staging_table = properties::named(
            &attribute.properties,
            &self.rules.properties.staging_table,
        )
        .map(|(_, value)| value.trim())
        .find(|value| !value.is_empty())
        .map(ToString::to_string);

        ResolvedMappingRow {
            ordinal: Some(attribute.ordinal),
            target_table: entity.name.clone(),
            target_column: attribute.name.clone(),
            description: attribute.description.clone(),
            source_table: sourcing.source_table,
            source_column: sourcing.source_column,
            defaults: self.defaults(&attribute.name, &data_type),
            data_type,
            nullable: Some(nullable),
            is_primary_key,
            is_foreign_key,
            is_clustering_key,
            is_partition_key,
            sourcing: Some(if is_foreign_key || sourcing.explicit_derivation {
                SourcingKind::Derived
            } else {
                SourcingKind::Sourced
            }),
            derivation: sourcing.derivation,
            referenced_dimension,
            staging_table,
            warnings,
            cell_text: BTreeMap::new(),
        }
    }

    /// Resolve every attribute of an entity in document order
    #[must_use]
    pub fn resolve_entity(&self, entity: &Entity) -> Vec<ResolvedMappingRow> {
        entity
            .attributes
            .iter()
            .map(|attribute| self.resolve(entity, attribute))
            .collect()
    }

    /// Metadata block of an entity's sheet
    #[must_use]
    pub fn table_metadata(&self, entity: &Entity) -> TableMetadata {
        TableMetadata {
            name: entity.name.clone(),
            description: entity.description.clone(),
            table_options: self
                .table_options(entity)
                .filter(|o| !o.trim().is_empty())
                .map(ToString::to_string),
            sources: properties::source_dependencies(&entity.properties),
            notes: key_notes(entity),
        }
    }

    /// Mapping document for the given entities, one sheet each
    #[must_use]
    pub fn document<'a>(&self, entities: impl IntoIterator<Item = &'a Entity>) -> MappingDocument {
        MappingDocument {
            sheets: entities
                .into_iter()
                .map(|entity| MappingSheet {
                    table: self.table_metadata(entity),
                    rows: self.resolve_entity(entity),
                })
                .collect(),
        }
    }

    fn table_options<'e>(&self, entity: &'e Entity) -> Option<&'e str> {
        let names = std::slice::from_ref(&self.rules.properties.table_options);
        properties::named(&entity.properties, names)
            .map(|(_, value)| value)
            .next()
    }

    /// Clustering/partitioning flag from attribute properties, entity column
    /// lists or table-option DDL
    fn flag_set(
        &self,
        entity: &Entity,
        attribute: &Attribute,
        names: &[String],
        from_ddl: bool,
    ) -> bool {
        let truthy = &self.rules.properties.truthy_values;
        from_ddl
            || properties::named(&attribute.properties, names)
                .any(|(_, value)| properties::is_truthy(value, truthy))
            || properties::named(&entity.properties, names).any(|(_, value)| {
                properties::column_list(value).any(|c| c.eq_ignore_ascii_case(&attribute.name))
            })
    }

    fn sourcing(&self, entity: &Entity, attribute: &Attribute) -> Sourcing {
        let names = &self.rules.properties;
        let separator = names.source_separator.as_str();

        let mut derivations = Vec::new();
        for wanted in &names.derivation {
            derivations.extend(
                properties::named(&attribute.properties, std::slice::from_ref(wanted))
                    .filter(|(_, value)| !value.trim().is_empty()),
            );
        }

        let mut warnings = Vec::new();
        let derivation = derivations.first().map(|(name, value)| {
            if derivations.len() > 1 {
                let ignored: Vec<String> = derivations[1..]
                    .iter()
                    .map(|(n, _)| (*n).to_string())
                    .collect();
                warn!(
                    "{}.{}: derivation taken from '{name}', ignoring {}",
                    entity.name,
                    attribute.name,
                    ignored.join(", ")
                );
                warnings.push(ResolutionWarning::ConflictingDerivation {
                    chosen: (*name).to_string(),
                    ignored,
                });
            }
            (*value).to_string()
        });

        let joined = |prefix: &str| {
            let values: Vec<&str> = properties::prefixed(&attribute.properties, prefix).collect();
            (!values.is_empty()).then(|| values.join(separator))
        };
        let source_table = joined(&names.source_table_prefix);
        let source_column = joined(&names.source_column_prefix);

        if derivation.is_some() || source_table.is_some() || source_column.is_some() {
            if derivation.is_none() && source_column.is_none() {
                warnings.push(ResolutionWarning::UnresolvedSourcing);
            }
            return Sourcing {
                source_table,
                source_column,
                explicit_derivation: derivation.is_some(),
                derivation,
                warnings,
            };
        }

        if let Some(compiled) = self
            .conventions
            .iter()
            .find(|c| c.pattern.is_match(&attribute.name))
        {
            debug!(
                "{}.{} sourced by naming convention '{}'",
                entity.name, attribute.name, compiled.convention.pattern
            );
            return Sourcing {
                source_table: Some(
                    compiled
                        .convention
                        .source_table
                        .replace("{entity}", &entity.name),
                ),
                source_column: Some(attribute.name.clone()),
                derivation: compiled.convention.note.clone(),
                explicit_derivation: false,
                warnings,
            };
        }

        warnings.push(ResolutionWarning::UnresolvedSourcing);
        Sourcing {
            warnings,
            ..Sourcing::default()
        }
    }

    fn defaults(&self, column: &str, data_type: &str) -> DefaultValues {
        let lower = column.to_ascii_lowercase();
        self.rules
            .default_overrides
            .iter()
            .find(|o| {
                lower.contains(&o.name_contains.to_ascii_lowercase())
                    && o
                        .data_type
                        .as_deref()
                        .is_none_or(|t| t.eq_ignore_ascii_case(data_type))
            })
            .map(|o| o.values.clone())
            .or_else(|| {
                self.rules
                    .default_values
                    .get(&dezmap_core::config::normalize_type(data_type))
                    .cloned()
            })
            .unwrap_or_default()
    }
}

/// Key warnings that no row carries
///
/// Rows of foreign key members already report their key's dangling target, so
/// only member problems and dangling keys without resolved members are left.
fn key_notes(entity: &Entity) -> Vec<ResolutionWarning> {
    entity
        .keys
        .iter()
        .flat_map(|key| {
            let on_rows = key.kind == KeyKind::Foreign && !key.members.is_empty();
            key.warnings.iter().filter(move |w| {
                !(on_rows && matches!(w, ResolutionWarning::DanglingForeignKey { .. }))
            })
        })
        .cloned()
        .collect()
}
