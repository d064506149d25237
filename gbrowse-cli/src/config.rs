//! Configuration discovery for the gbrowse CLI
//!
//! An explicit `--config` path wins; otherwise `gbrowse.toml` in the current
//! directory is used when present, falling back to built-in defaults.

use anyhow::{Context, Result};
use gbrowse_core::{BrowserConfig, InMemoryDatabase};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "gbrowse.toml";

/// Load configuration from file or use defaults
pub fn load(config_path: Option<&Path>) -> Result<BrowserConfig> {
    let config = match config_path {
        Some(path) => BrowserConfig::load_from_file(path)?,
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                BrowserConfig::load_from_file(&default_path)?
            } else {
                log::info!("Using default configuration");
                BrowserConfig::default()
            }
        }
    };

    Ok(config)
}

/// Open the GFF3 feature database named by the configuration
pub fn open_database(config: &BrowserConfig) -> Result<InMemoryDatabase> {
    let path = config.database_path()?;
    gbrowse_core::gff::load_database(path)
        .with_context(|| format!("Failed to load feature database: {}", path.display()))
}
