//! Schema model reader for DeZign `.dez` documents
//!
//! Parses the XML export into a [`SchemaModel`]: entities with their
//! attributes, keys and user-defined properties, with foreign keys resolved
//! against the whole document. The reader works on text only; reading the file
//! is left to the caller.

mod builder;
pub mod grammar;
pub mod xml;

use dezmap_core::error::Result;
use dezmap_core::types::SchemaModel;
use tracing::{debug, info};

/// Reader for `.dez` documents
#[derive(Debug, Clone, Default)]
pub struct SchemaReader {
    version: Option<String>,
}

impl SchemaReader {
    /// Create a reader for the current model version
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a specific model version of a multi-version document
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Parse a document into a normalized model
    ///
    /// # Errors
    ///
    /// Returns `MappingError::Parse` with the offending element path when the
    /// XML is malformed, an entity has no name, an attribute has no name or
    /// data type, or the requested version does not exist.
    pub fn parse(&self, content: &str) -> Result<SchemaModel> {
        let root = xml::parse_tree(content)?;
        debug!("Parsed element tree rooted at <{}>", root.name);

        let scope = builder::select_version(&root, self.version.as_deref())?;
        let model = builder::build_model(scope)?;

        info!(
            "Read {} entities with {} attributes",
            model.entities.len(),
            model.attribute_count()
        );
        Ok(model)
    }
}
