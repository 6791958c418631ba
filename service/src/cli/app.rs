//! `dezmap` CLI application

use super::types::{DezmapCli, DezmapCommand, OutputFormat};
use crate::config::ConverterConfig;
use crate::service::{EntityListing, MappingService};
use clap::Parser;
use colored::Colorize;
use dezmap_core::error::{MappingError, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Main `dezmap` CLI application
pub struct DezmapApp {
    cli: DezmapCli,
}

impl DezmapApp {
    /// Create the application from command line arguments
    #[must_use]
    pub fn from_args() -> Self {
        Self {
            cli: DezmapCli::parse(),
        }
    }

    /// Create the application with a parsed command line
    #[must_use]
    pub fn new(cli: DezmapCli) -> Self {
        Self { cli }
    }

    /// Run the application
    ///
    /// # Errors
    ///
    /// Returns the error of the failed command.
    pub fn run(self) -> Result<()> {
        self.init_logging();
        info!("Starting dezmap");

        match self.execute_command() {
            Ok(()) => {
                info!("Command completed successfully");
                Ok(())
            }
            Err(err) => {
                error!("Command failed: {}", err);
                if !self.cli.quiet {
                    eprintln!("{} {err}", "Error:".red().bold());
                }
                Err(err)
            }
        }
    }

    /// Configure tracing subscriber based on CLI flags; `RUST_LOG` wins when set
    fn init_logging(&self) {
        let level = if self.cli.quiet {
            "error"
        } else if self.cli.verbose {
            "debug"
        } else {
            "info"
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        // A subscriber may already be installed when embedded
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }

    fn service(&self, output_dir: Option<&PathBuf>) -> Result<MappingService> {
        let config = match &self.cli.config {
            Some(path) => ConverterConfig::from_file(path)?,
            None => ConverterConfig::default(),
        };
        let service = MappingService::new(config)?;
        Ok(match output_dir {
            Some(dir) => service.with_output_dir(dir),
            None => service,
        })
    }

    fn execute_command(&self) -> Result<()> {
        match &self.cli.command {
            DezmapCommand::Convert {
                input,
                entities,
                all,
                output_dir,
            } => self.convert_command(input, entities, *all, output_dir.as_ref()),
            DezmapCommand::Upgrade { old, output_dir } => {
                self.upgrade_command(old, output_dir.as_ref())
            }
            DezmapCommand::List { input } => self.list_command(input),
        }
    }

    fn convert_command(
        &self,
        input: &Path,
        entities: &[String],
        all: bool,
        output_dir: Option<&PathBuf>,
    ) -> Result<()> {
        let service = self.service(output_dir)?;
        let written = if all {
            service.convert_all(input)?
        } else {
            service.convert(input, entities)?
        };
        self.report_written("Mapping document written", &written);
        Ok(())
    }

    fn upgrade_command(&self, old: &Path, output_dir: Option<&PathBuf>) -> Result<()> {
        let written = self.service(output_dir)?.upgrade(old)?;
        self.report_written("Upgraded document written", &written);
        Ok(())
    }

    fn list_command(&self, input: &Path) -> Result<()> {
        let listing = self.service(None)?.list(input)?;
        match self.cli.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&listing)
                    .map_err(|e| MappingError::other_with_source("Failed to encode listing", e))?;
                println!("{json}");
            }
            OutputFormat::Pretty => print!("{}", format_listing(&listing)),
        }
        Ok(())
    }

    fn report_written(&self, label: &str, path: &Path) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "output": path.display().to_string() }));
            }
            OutputFormat::Pretty if !self.cli.quiet => {
                println!("{} {label}: {}", "✓".green(), path.display());
            }
            OutputFormat::Pretty => {}
        }
    }
}

/// Human-readable entity listing
fn format_listing(listing: &EntityListing) -> String {
    let mut out = String::new();
    for diagram in &listing.diagrams {
        out.push_str(&format!("{}\n", diagram.name.bold()));
        for entity in &diagram.entities {
            out.push_str(&format!("  {entity}\n"));
        }
    }
    if !listing.unplaced.is_empty() {
        out.push_str(&format!("{}\n", "(no diagram)".yellow()));
        for entity in &listing.unplaced {
            out.push_str(&format!("  {entity}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::DiagramListing;

    #[test]
    fn test_format_listing() {
        colored::control::set_override(false);
        let listing = EntityListing {
            diagrams: vec![DiagramListing {
                name: "Sales".to_string(),
                entities: vec!["Orders".to_string()],
            }],
            unplaced: vec!["Audit".to_string()],
        };
        assert_eq!(
            format_listing(&listing),
            "Sales\n  Orders\n(no diagram)\n  Audit\n"
        );
    }
}
