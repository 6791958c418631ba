//! `dezmap` command-line interface
//!
//! Generates mapping documents from DeZign models and upgrades legacy
//! mapping documents.

use dezmap_service::cli;

fn main() -> anyhow::Result<()> {
    cli::run()?;
    Ok(())
}
