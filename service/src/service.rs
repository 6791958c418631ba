//! Conversion service tying the pipeline stages together
//!
//! `MappingService` reads a model file, resolves the selected entities and
//! writes their mapping document; it also upgrades legacy documents. All
//! stages are configured once from a [`ConverterConfig`].

use crate::config::ConverterConfig;
use crate::derivation::DerivationEngine;
use crate::mapping_table::ColumnMappingTable;
use crate::reader::SchemaReader;
use crate::upgrader::LegacyUpgrader;
use crate::writer::DocumentWriter;
use dezmap_core::error::{MappingError, Result};
use dezmap_core::types::{Entity, EntityId, ResolutionWarning, SchemaModel, TemplateVersion};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Suffix of upgraded document names
pub const UPGRADED_SUFFIX: &str = "_UPDATED";

/// Output document extension
pub const OUTPUT_EXTENSION: &str = "xlsx";

/// Entities of a model grouped by the diagrams showing them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityListing {
    /// Diagrams in document order
    pub diagrams: Vec<DiagramListing>,
    /// Entities placed on no diagram
    pub unplaced: Vec<String>,
}

/// Entity names shown on one diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagramListing {
    /// Diagram name
    pub name: String,
    /// Entity names in diagram order
    pub entities: Vec<String>,
}

impl EntityListing {
    /// Group the entities of a model
    #[must_use]
    pub fn from_model(model: &SchemaModel) -> Self {
        let name_of = |id: &EntityId| model.entity(*id).map(|e| e.name.clone());
        let placed: HashSet<EntityId> = model
            .diagrams
            .iter()
            .flat_map(|d| d.entities.iter().copied())
            .collect();

        Self {
            diagrams: model
                .diagrams
                .iter()
                .map(|d| DiagramListing {
                    name: d.name.clone(),
                    entities: d.entities.iter().filter_map(name_of).collect(),
                })
                .collect(),
            unplaced: model
                .entities
                .iter()
                .filter(|e| !placed.contains(&e.id))
                .map(|e| e.name.clone())
                .collect(),
        }
    }
}

/// Model to mapping document conversion service
#[derive(Debug, Clone)]
pub struct MappingService {
    reader: SchemaReader,
    engine: DerivationEngine,
    writer: DocumentWriter,
    upgrader: LegacyUpgrader,
    output_dir: Option<PathBuf>,
}

impl MappingService {
    /// Build every stage from a configuration
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Config` if the rules are invalid and
    /// `MappingError::SelfCheck` if the column mapping table is inconsistent.
    pub fn new(config: ConverterConfig) -> Result<Self> {
        let table = ColumnMappingTable::builtin()?;
        let engine = DerivationEngine::new(config.rules)?;

        let reader = match config.reader.model_version {
            Some(version) => SchemaReader::new().with_version(version),
            None => SchemaReader::new(),
        };

        let mut writer = DocumentWriter::new(table.clone())
            .with_features(config.writer.features())
            .with_version_control(config.version_control);
        for (version, path) in config.templates.iter() {
            writer = writer.with_template(version, path);
        }

        Ok(Self {
            reader,
            engine,
            writer,
            upgrader: LegacyUpgrader::new(table),
            output_dir: config.output.directory,
        })
    }

    /// Write documents to `dir` instead of the configured location
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Derivation engine in use
    #[must_use]
    pub fn engine(&self) -> &DerivationEngine {
        &self.engine
    }

    /// Document writer in use
    #[must_use]
    pub fn writer(&self) -> &DocumentWriter {
        &self.writer
    }

    /// Read and parse a model file
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Io` if the file cannot be read and
    /// `MappingError::Parse` if it is not a valid model document.
    pub fn parse(&self, input: &Path) -> Result<SchemaModel> {
        let content = std::fs::read_to_string(input)?;
        debug!("Read {} bytes from {}", content.len(), input.display());
        let model = self.reader.parse(&content)?;
        for warning in &model.warnings {
            warn!("{warning}");
        }
        Ok(model)
    }

    /// Entities of a model file grouped by diagram
    ///
    /// # Errors
    ///
    /// Returns the errors of [`MappingService::parse`].
    pub fn list(&self, input: &Path) -> Result<EntityListing> {
        Ok(EntityListing::from_model(&self.parse(input)?))
    }

    /// Convert the selected entities of a model file
    ///
    /// One selected entity gives `<entity>.xlsx`, several give
    /// `<input stem>.xlsx`.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::NoSelection` for an empty selection,
    /// `MappingError::UnknownEntity` for a name missing from the model, and the
    /// reader and writer errors.
    pub fn convert(&self, input: &Path, selected: &[String]) -> Result<PathBuf> {
        if selected.is_empty() {
            return Err(MappingError::NoSelection);
        }
        let model = self.parse(input)?;
        let entities = select(&model, selected)?;
        self.write_entities(input, &entities, &model.warnings)
    }

    /// Convert every entity of a model file
    ///
    /// # Errors
    ///
    /// Returns `MappingError::NoSelection` if the model has no entities, and
    /// the reader and writer errors.
    pub fn convert_all(&self, input: &Path) -> Result<PathBuf> {
        let model = self.parse(input)?;
        if model.entities.is_empty() {
            return Err(MappingError::NoSelection);
        }
        let entities: Vec<&Entity> = model.entities.iter().collect();
        self.write_entities(input, &entities, &model.warnings)
    }

    /// Write the entities' document; model warnings go to every sheet's notes
    fn write_entities(
        &self,
        input: &Path,
        entities: &[&Entity],
        model_warnings: &[ResolutionWarning],
    ) -> Result<PathBuf> {
        let mut document = self.engine.document(entities.iter().copied());
        for sheet in &mut document.sheets {
            sheet.table.notes.extend_from_slice(model_warnings);
        }
        let unresolved = document
            .rows()
            .filter(|r| r.is_sourcing_unresolved())
            .count();
        if unresolved > 0 {
            warn!("{unresolved} rows have no resolved sourcing");
        }

        let file_name = match entities {
            [entity] => file_stem_safe(&entity.name),
            _ => stem_of(input),
        };
        let dest = self.destination(input, &file_name)?;
        let written = self
            .writer
            .write_document(&document, TemplateVersion::CURRENT, &dest)?;
        info!(
            "Converted {} entities into {}",
            entities.len(),
            written.display()
        );
        Ok(written)
    }

    /// Upgrade a legacy mapping document into the current layout
    ///
    /// The result is written next to the input (or to the output directory)
    /// as `<stem>_UPDATED.xlsx`; the input is never modified.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::FormatMismatch` if the document is not in the
    /// legacy layout, and the writer errors.
    pub fn upgrade(&self, old: &Path) -> Result<PathBuf> {
        let document = self.upgrader.upgrade(old)?;
        let file_name = format!("{}{UPGRADED_SUFFIX}", stem_of(old));
        let dest = self.destination(old, &file_name)?;
        let written =
            self.writer
                .write_document(&document, self.upgrader.target_version(), &dest)?;
        info!("Upgraded {} into {}", old.display(), written.display());
        Ok(written)
    }

    fn destination(&self, input: &Path, file_name: &str) -> Result<PathBuf> {
        let dir = match &self.output_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                dir.clone()
            }
            None => input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        Ok(dir.join(format!("{file_name}.{OUTPUT_EXTENSION}")))
    }
}

/// Resolve selected names in selection order, ignoring repeats
fn select<'a>(model: &'a SchemaModel, selected: &[String]) -> Result<Vec<&'a Entity>> {
    let mut seen = HashSet::new();
    let mut entities = Vec::with_capacity(selected.len());
    for name in selected {
        if !seen.insert(name.as_str()) {
            continue;
        }
        let entity = model
            .entity_by_name(name)
            .ok_or_else(|| MappingError::unknown_entity(name.as_str()))?;
        entities.push(entity);
    }
    Ok(entities)
}

fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "mapping".to_string())
}

fn file_stem_safe(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
