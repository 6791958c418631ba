//! Error types for mapping document operations

use crate::types::{LogicalField, TemplateVersion};
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for model conversion and document upgrades
#[derive(Error, Debug)]
pub enum MappingError {
    /// Malformed or incomplete schema document
    #[error("Failed to parse model document: {message}{}", location_suffix(.location))]
    Parse {
        /// Error message
        message: String,
        /// Element path of the offending element if available
        location: Option<String>,
    },

    /// Logical field without a column in a template version
    #[error("No column for field '{field}' in template version {version}")]
    UnknownField {
        /// Template version that was consulted
        version: TemplateVersion,
        /// Field that has no entry
        field: LogicalField,
    },

    /// Column mapping table failed its load-time consistency check
    #[error("Column mapping self-check failed: {0}")]
    SelfCheck(String),

    /// Output could not be produced or published
    #[error("Failed to write mapping document: {message}")]
    Output {
        /// Error message
        message: String,
        /// Destination or template path involved
        path: Option<PathBuf>,
    },

    /// Legacy document does not carry the expected layout signature
    #[error("Document does not match the legacy mapping layout: {message}")]
    FormatMismatch {
        /// Error message
        message: String,
        /// Sheet that was inspected, if any
        sheet: Option<String>,
    },

    /// Conversion requested without any entity
    #[error("No entities selected for conversion")]
    NoSelection,

    /// Selected entity is not present in the parsed model
    #[error("Entity '{name}' is not defined in the model")]
    UnknownEntity {
        /// Requested entity name
        name: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

fn location_suffix(location: &Option<String>) -> String {
    location
        .as_ref()
        .map(|loc| format!(" (at {loc})"))
        .unwrap_or_default()
}

/// Result type alias for mapping operations
pub type Result<T> = std::result::Result<T, MappingError>;

impl MappingError {
    /// Create a new parse error
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            location: None,
        }
    }

    /// Create a new parse error with the element path it refers to
    #[must_use]
    pub fn parse_at(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            location: Some(location.into()),
        }
    }

    /// Create a new output error
    #[must_use]
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
            path: None,
        }
    }

    /// Create a new output error for a specific path
    #[must_use]
    pub fn output_at(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Output {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Create a new format mismatch error
    #[must_use]
    pub fn format_mismatch(message: impl Into<String>) -> Self {
        Self::FormatMismatch {
            message: message.into(),
            sheet: None,
        }
    }

    /// Create a new format mismatch error for a sheet
    #[must_use]
    pub fn format_mismatch_in(message: impl Into<String>, sheet: impl Into<String>) -> Self {
        Self::FormatMismatch {
            message: message.into(),
            sheet: Some(sheet.into()),
        }
    }

    /// Create a new unknown entity error
    #[must_use]
    pub fn unknown_entity(name: impl Into<String>) -> Self {
        Self::UnknownEntity { name: name.into() }
    }

    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error with source
    #[must_use]
    pub fn other_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Other {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = MappingError::parse("unexpected end of document");
        assert!(matches!(err, MappingError::Parse { location: None, .. }));

        let err = MappingError::parse_at("entity has no NAME", "ENTITIES/ENT[2]");
        match err {
            MappingError::Parse { location, .. } => {
                assert_eq!(location.as_deref(), Some("ENTITIES/ENT[2]"));
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = MappingError::parse_at("attribute has no data type", "ENTITIES/ENT[1]/ATTRIBUTES/ATTR[3]");
        let display = err.to_string();
        assert!(display.contains("attribute has no data type"));
        assert!(display.contains("ENT[1]/ATTRIBUTES/ATTR[3]"));

        let err = MappingError::UnknownField {
            version: TemplateVersion::V1_7,
            field: LogicalField::Clustering,
        };
        assert_eq!(
            err.to_string(),
            "No column for field 'Clustering' in template version 1-7"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: MappingError = io.into();
        assert!(matches!(err, MappingError::Io(_)));
    }
}
