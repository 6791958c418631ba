//! Command-line interface of the `dezmap` tool

mod app;
mod types;

pub use app::DezmapApp;
pub use types::{DezmapCli, DezmapCommand, OutputFormat};

/// Main entry point for the CLI
///
/// # Errors
/// Returns error if the command fails.
pub fn run() -> dezmap_core::error::Result<()> {
    DezmapApp::from_args().run()
}
