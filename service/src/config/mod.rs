//! Configuration loading for the converter
//!
//! This module provides configuration loading from YAML files with
//! environment variable substitution support. Every section is optional and
//! falls back to the built-in conventions.

pub mod validation;

use crate::writer::{VersionControlEntry, WriterFeatures};
use dezmap_core::config::RulesConfig;
use dezmap_core::error::{MappingError, Result};
use dezmap_core::types::TemplateVersion;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load configuration from `YAML` file with environment variable substitution
///
/// # Errors
///
/// Returns `MappingError::Io` if the file cannot be read
/// Returns `MappingError::Config` if the YAML cannot be parsed
pub fn load_config<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path)?;
    let substituted = substitute_env_vars(&contents);

    serde_yaml::from_str(&substituted)
        .map_err(|e| MappingError::config(format!("Failed to parse YAML config: {e}")))
}

/// Substitute environment variables in the format ${VAR:-default}
fn substitute_env_vars(content: &str) -> String {
    let Ok(re) = regex::Regex::new(r"\$\{([^}:]+)(?::(-)?([^}]*))?\}") else {
        return content.to_string();
    };

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default_value = caps.get(3).map_or("", |m| m.as_str());

        env::var(var_name).unwrap_or_else(|_| default_value.to_string())
    })
    .to_string()
}

/// Complete converter configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Derivation rules
    pub rules: RulesConfig,
    /// Model reader options
    pub reader: ReaderConfig,
    /// Style template files
    pub templates: TemplateConfig,
    /// Output location
    pub output: OutputConfig,
    /// Version history entry of generated documents
    pub version_control: VersionControlEntry,
    /// Optional document parts
    pub writer: WriterConfig,
}

impl ConverterConfig {
    /// Load, validate and normalize a configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a value is
    /// invalid (see [`validation::validate_values`]).
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = load_config(path)?;
        validation::validate_values(&config)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config.normalized())
    }

    /// Configuration with rule table keys in lookup form
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.rules = self.rules.normalized();
        self
    }
}

/// Model reader options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Model version to read from multi-version documents; current if unset
    pub model_version: Option<String>,
}

/// Style template files by layout; bundled templates are used when unset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Template of the current layout
    pub current: Option<PathBuf>,
    /// Template of the legacy layout
    pub legacy: Option<PathBuf>,
}

impl TemplateConfig {
    /// Configured templates with their versions
    pub fn iter(&self) -> impl Iterator<Item = (TemplateVersion, &Path)> {
        [
            (TemplateVersion::CURRENT, self.current.as_deref()),
            (TemplateVersion::LEGACY, self.legacy.as_deref()),
        ]
        .into_iter()
        .filter_map(|(version, path)| path.map(|p| (version, p)))
    }
}

/// Output location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving generated documents; the input's directory if unset
    pub directory: Option<PathBuf>,
}

/// Optional parts of generated documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// Freeze panes below the table header
    pub freeze_headers: bool,
    /// Autofilter on the table
    pub add_filters: bool,
    /// Leading version history sheet
    pub version_control: bool,
    /// Conditional row styling
    pub row_styling: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            freeze_headers: true,
            add_filters: true,
            version_control: true,
            row_styling: true,
        }
    }
}

impl WriterConfig {
    /// Enabled writer features
    #[must_use]
    pub fn features(&self) -> WriterFeatures {
        let mut features = WriterFeatures::NONE;
        features.set(WriterFeatures::FREEZE_HEADERS, self.freeze_headers);
        features.set(WriterFeatures::ADD_FILTERS, self.add_filters);
        features.set(WriterFeatures::VERSION_CONTROL, self.version_control);
        features.set(WriterFeatures::ROW_STYLING, self.row_styling);
        features
    }
}
