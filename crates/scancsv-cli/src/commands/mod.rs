//! CLI subcommands.

pub mod check;
pub mod config;
pub mod parse;
pub mod run;

use std::path::Path;

use tracing::debug;

use scancsv_core::ScanConfig;

/// Load the explicit config file, else the default one if present, else defaults.
pub fn load_config(config_path: Option<&Path>) -> anyhow::Result<ScanConfig> {
    if let Some(path) = config_path {
        debug!("Loading config from {}", path.display());
        return Ok(ScanConfig::from_file(path)?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(ScanConfig::from_file(&default_path)?)
    } else {
        Ok(ScanConfig::default())
    }
}
