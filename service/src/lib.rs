//! # dezmap
//!
//! Source-to-target mapping documents from DeZign data models.
//!
//! ## Overview
//!
//! The crate turns a `.dez` model into the `.xlsx` mapping document used to
//! hand a target data model over to the ETL developers, and upgrades mapping
//! documents written in the legacy layout.
//!
//! - **Reader**: parses the model XML into entities, attributes and resolved keys
//! - **Derivation**: target types, defaults, key and storage flags, sourcing
//! - **Column mapping table**: versioned placement of every document field
//! - **Writer**: styled workbook rendering with atomic publishing
//! - **Upgrader**: legacy documents re-projected into the current layout
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dezmap_service::config::ConverterConfig;
//! use dezmap_service::service::MappingService;
//! use std::path::Path;
//!
//! fn main() -> dezmap_core::Result<()> {
//!     let service = MappingService::new(ConverterConfig::default())?;
//!     let written = service.convert(Path::new("model.dez"), &["Orders".to_string()])?;
//!     println!("wrote {}", written.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! .dez -> SchemaReader -> SchemaModel -> DerivationEngine -> MappingDocument -> DocumentWriter -> .xlsx
//! legacy .xlsx -> LegacyUpgrader -> MappingDocument -> DocumentWriter -> .xlsx
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)] // subjective determination
#![allow(clippy::doc_markdown)] // DeZign, ETL and layout names are proper nouns
#![allow(clippy::format_push_string)] // format! macro is more readable than write!

/// Model document reader
pub mod reader;

/// Defaulting and derivation engine
pub mod derivation;

/// Versioned column mapping table
pub mod mapping_table;

/// Workbook writer
pub mod writer;

/// Legacy document upgrader
pub mod upgrader;

/// Configuration loading
pub mod config;

/// Conversion service
pub mod service;

/// Command-line interface
pub mod cli;

/// Commonly used items
pub mod prelude;

pub use dezmap_core::error::{MappingError, Result};
