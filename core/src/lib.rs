//! # dezmap core
//!
//! Core types, rule tables and errors shared by the model reader, the
//! derivation engine, the document writer and the legacy upgrader.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Error types for mapping operations
pub mod error;

/// Model and mapping document types
pub mod types;

/// Cell text of logical fields
pub mod fields;

/// Rule tables for the derivation engine
pub mod config;

pub use error::{MappingError, Result};

/// Commonly used items
pub mod prelude {
    pub use crate::config::{
        DefaultOverride, NamingConvention, PropertyNames, RulesConfig, TypeRule,
    };
    pub use crate::error::{MappingError, Result};
    pub use crate::types::{
        Attribute, AttributeId, DefaultValues, Diagram, Entity, EntityId, Key, KeyKind,
        KeyReference, LogicalField, MappingDocument, MappingSheet, Properties,
        ResolutionWarning, ResolvedMappingRow, SchemaModel, SourceDependency, SourcingKind,
        TableMetadata, TemplateVersion,
    };
}
