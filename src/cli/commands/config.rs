//! Config Command
//!
//! Manage taleweave configuration.
//!
//! Usage:
//!   taleweave config show [-f json]
//!   taleweave config path
//!   taleweave config init [-g] [--force]

use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged effective configuration
pub fn show(format: &str) -> Result<()> {
    ConfigLoader::show_config(format == "json")
}

/// Show configuration file paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Write a default configuration file
pub fn init(global: bool, force: bool) -> Result<()> {
    let path = ConfigLoader::init(global, force)?;
    println!("✓ Initialized configuration");
    println!("  Config: {}", path.display());
    Ok(())
}
