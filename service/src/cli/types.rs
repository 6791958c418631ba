//! CLI type definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Mapping document generator for DeZign data models
#[derive(Parser, Debug)]
#[command(
    name = "dezmap",
    version,
    about = "Generate source-to-target mapping documents from DeZign models"
)]
pub struct DezmapCli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode - suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, global = true, default_value = "pretty")]
    pub format: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: DezmapCommand,
}

/// Output formats for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Pretty,
    /// JSON output
    Json,
}

/// `dezmap` subcommands
#[derive(Subcommand, Debug)]
pub enum DezmapCommand {
    /// Convert model entities into a mapping document
    Convert {
        /// Model file (.dez)
        input: PathBuf,
        /// Entity to convert (repeatable)
        #[arg(short, long = "entity", value_name = "NAME", conflicts_with = "all")]
        entities: Vec<String>,
        /// Convert every entity of the model
        #[arg(long)]
        all: bool,
        /// Directory receiving the document
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Upgrade a legacy mapping document to the current layout
    Upgrade {
        /// Legacy mapping document (.xlsx)
        old: PathBuf,
        /// Directory receiving the upgraded document
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// List the entities of a model grouped by diagram
    List {
        /// Model file (.dez)
        input: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        DezmapCli::command().debug_assert();
    }

    #[test]
    fn test_parse_convert() {
        let cli = DezmapCli::parse_from([
            "dezmap", "convert", "model.dez", "-e", "Orders", "--entity", "Customers", "-q",
        ]);
        assert!(cli.quiet);
        match cli.command {
            DezmapCommand::Convert { entities, all, .. } => {
                assert_eq!(entities, vec!["Orders", "Customers"]);
                assert!(!all);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_entity_conflicts_with_all() {
        let result =
            DezmapCli::try_parse_from(["dezmap", "convert", "model.dez", "-e", "Orders", "--all"]);
        assert!(result.is_err());
    }
}
