//! Prelude module for the mapping service
//!
//! This module re-exports commonly used types and functions for convenient import.

// Re-export core types
pub use dezmap_core::prelude::*;

// Re-export pipeline stages
pub use crate::derivation::DerivationEngine;
pub use crate::mapping_table::{ColumnMappingEntry, ColumnMappingTable, Placement, Transform};
pub use crate::reader::SchemaReader;
pub use crate::upgrader::LegacyUpgrader;
pub use crate::writer::{DocumentWriter, StyleTemplate, VersionControlEntry, WriterFeatures};

// Re-export the service
pub use crate::config::ConverterConfig;
pub use crate::service::{EntityListing, MappingService};
