//! Config command implementation - print or check configuration

use anyhow::{Context, Result};
use gbrowse_core::BrowserConfig;
use std::path::PathBuf;

pub fn execute(config: &BrowserConfig, example: bool, output: Option<PathBuf>) -> Result<()> {
    if example {
        let content = BrowserConfig::example_toml()?;
        match output {
            Some(path) => {
                std::fs::write(&path, content)
                    .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;
                log::info!("Wrote example configuration to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    config.validate()?;
    let labels: Vec<&str> = config.labels().collect();
    println!("Database: {}", config.general.database.as_ref().map_or("(none)".to_string(), |p| p.display().to_string()));
    println!("Zoom levels: {:?}", config.general.zoom_levels);
    println!("Merge distance: {}", config.merge_distance());
    println!("Tracks ({}): {}", labels.len(), labels.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_example_written_and_reloadable() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("gbrowse.toml");
        execute(&BrowserConfig::default(), true, Some(path.clone()))?;

        let loaded = BrowserConfig::load_from_file(&path)?;
        assert!(loaded.has_track("Genes:100000"));
        assert!(loaded.is_global_feature("Overview"));
        Ok(())
    }
}
