//! Document writer for mapping workbooks
//!
//! Renders resolved mapping rows into an `.xlsx` workbook laid out by the
//! column mapping table and styled by the version's template. The workbook is
//! rendered into memory first and then published atomically.
//!
//! ## Workbook layout
//!
//! - `Version Control` sheet with the configured version entry
//! - one `Transformation - Sourcing (n)` sheet per target table: title,
//!   template version, table metadata, sourcing dependencies and the
//!   transformation table
//!
//! The document creation time is fixed so equal input gives byte-identical
//! files.

mod cast;
mod features;
mod publish;
mod sheets;
pub mod template;

pub use features::WriterFeatures;
pub use publish::publish;
pub use sheets::VersionControlEntry;
pub use template::{CellStyle, FormatRule, RowPredicate, StyleTemplate};

use crate::mapping_table::ColumnMappingTable;
use dezmap_core::error::{MappingError, Result};
use dezmap_core::types::{MappingDocument, ResolvedMappingRow, TemplateVersion};
use rust_xlsxwriter::{DocProperties, ExcelDateTime, Format, Workbook, XlsxError};
use sheets::SheetContext;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

pub(crate) fn xlsx_error(e: XlsxError) -> MappingError {
    MappingError::output(format!("workbook error: {e}"))
}

/// Formats of the fixed parts of a sheet
pub(crate) struct Styles {
    pub(crate) title: Format,
    pub(crate) label: Format,
    pub(crate) value: Format,
    pub(crate) header: Format,
    pub(crate) data: Format,
}

impl Styles {
    fn from_template(template: &StyleTemplate) -> Result<Self> {
        Ok(Self {
            title: template.title_style.to_format()?,
            label: template.label_style.to_format()?,
            value: template.value_style.to_format()?,
            header: template.header_style.to_format()?,
            data: template.data_style.to_format()?,
        })
    }
}

/// Writer of mapping workbooks
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    table: ColumnMappingTable,
    templates: BTreeMap<TemplateVersion, PathBuf>,
    features: WriterFeatures,
    version_control: VersionControlEntry,
}

impl DocumentWriter {
    /// Create a writer using the bundled templates and all features
    #[must_use]
    pub fn new(table: ColumnMappingTable) -> Self {
        Self {
            table,
            templates: BTreeMap::new(),
            features: WriterFeatures::ALL,
            version_control: VersionControlEntry::default(),
        }
    }

    /// Use a template file for a version instead of the bundled one
    #[must_use]
    pub fn with_template(mut self, version: TemplateVersion, path: impl Into<PathBuf>) -> Self {
        self.templates.insert(version, path.into());
        self
    }

    /// Set the enabled features
    #[must_use]
    pub fn with_features(mut self, features: WriterFeatures) -> Self {
        self.features = features;
        self
    }

    /// Set the version history entry
    #[must_use]
    pub fn with_version_control(mut self, entry: VersionControlEntry) -> Self {
        self.version_control = entry;
        self
    }

    /// Column mapping table in use
    #[must_use]
    pub fn table(&self) -> &ColumnMappingTable {
        &self.table
    }

    /// Template for a version, from its configured file or the bundled asset
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Output` if the template is missing or invalid.
    pub fn template(&self, version: TemplateVersion) -> Result<StyleTemplate> {
        match self.templates.get(&version) {
            Some(path) => StyleTemplate::load(path, version),
            None => StyleTemplate::bundled(version),
        }
    }

    /// Render a document into workbook bytes
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Output` if the template cannot be loaded or the
    /// workbook cannot be built.
    pub fn render(&self, document: &MappingDocument, version: TemplateVersion) -> Result<Vec<u8>> {
        let template = self.template(version)?;
        let styles = Styles::from_template(&template)?;
        let mut workbook = Workbook::new();

        let created = ExcelDateTime::from_ymd(2000, 1, 1).map_err(xlsx_error)?;
        let properties = DocProperties::new()
            .set_title("Mapping document")
            .set_creation_datetime(&created);
        workbook.set_properties(&properties);

        if self.features.contains(WriterFeatures::VERSION_CONTROL) {
            sheets::write_version_control(&mut workbook, &self.version_control, &styles)?;
        }

        let ctx = SheetContext {
            version,
            table: &self.table,
            template: &template,
            styles: &styles,
            features: self.features,
        };
        for (index, sheet) in document.sheets.iter().enumerate() {
            sheets::write_table_sheet(&mut workbook, index + 1, sheet, &ctx)?;
        }
        if document.sheets.is_empty() && !self.features.contains(WriterFeatures::VERSION_CONTROL) {
            workbook.add_worksheet();
        }

        workbook.save_to_buffer().map_err(xlsx_error)
    }

    /// Write rows grouped into one sheet per target table
    ///
    /// Sheets follow the order in which tables first appear. Inside a sheet the
    /// rows keep their input order, so interleaved rows `[a1, b1, a2]` give the
    /// sheets `[a1, a2]` and `[b1]`.
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Output` if rendering or publishing fails; no file
    /// is left under `dest` in that case.
    pub fn write(
        &self,
        rows: &[ResolvedMappingRow],
        version: TemplateVersion,
        dest: &Path,
    ) -> Result<PathBuf> {
        self.write_document(&MappingDocument::from_rows(rows), version, dest)
    }

    /// Write a document with its table metadata
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Output` if rendering or publishing fails; no file
    /// is left under `dest` in that case.
    pub fn write_document(
        &self,
        document: &MappingDocument,
        version: TemplateVersion,
        dest: &Path,
    ) -> Result<PathBuf> {
        let bytes = self.render(document, version)?;
        info!(
            "Rendered {} tables with {} rows for template {version}",
            document.sheets.len(),
            document.row_count()
        );
        publish(&bytes, dest)
    }
}
