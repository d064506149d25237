//! Browser configuration
//!
//! An immutable configuration value passed explicitly into every component.
//! It is loaded from a TOML file with a `[general]` table of typed settings
//! and one `[tracks."<label>"]` stanza per configured track. Track stanzas
//! are free-form: values may be strings, integers, booleans or string lists,
//! and are read back as whitespace-folded text through [`BrowserConfig::setting`].

use crate::error::{BrowseError, BrowseResult};
use crate::types::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Name of the stanza holding the global settings
pub const GENERAL: &str = "general";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    /// Track stanzas keyed by label, optionally zoom-qualified (`"Gene:5000"`)
    #[serde(default)]
    pub tracks: BTreeMap<String, Stanza>,
}

/// One configured track stanza
pub type Stanza = BTreeMap<String, SettingValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Flag(bool),
    Integer(i64),
    Text(String),
    List(Vec<String>),
}

impl SettingValue {
    /// Render as text with runs of whitespace and newlines folded to one space
    pub fn as_text(&self) -> String {
        match self {
            SettingValue::Flag(b) => String::from(if *b { "1" } else { "0" }),
            SettingValue::Integer(n) => n.to_string(),
            SettingValue::Text(s) => fold_whitespace(s),
            SettingValue::List(items) => fold_whitespace(&items.join(" ")),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        SettingValue::Integer(value)
    }
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        SettingValue::Flag(value)
    }
}

fn fold_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Option names are matched case-insensitively with spaces and dashes
/// treated as underscores, so `"bump density"` finds `bump_density`.
fn normalize_key(option: &str) -> String {
    option.trim().to_lowercase().replace([' ', '-'], "_")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Feature database (GFF3 file) backing location lookups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Classes tried in turn when a bare name finds nothing
    #[serde(default)]
    pub automatic_classes: Vec<String>,

    /// Ascending zoom thresholds; the last one is the merge distance
    #[serde(default = "default_zoom_levels")]
    pub zoom_levels: Vec<Position>,

    /// Longest single segment returned without merging sub-features
    #[serde(default = "default_max_segment")]
    pub max_segment: Position,

    /// Tracks with at most this many features are bumped automatically
    #[serde(default = "default_bump_density")]
    pub bump_density: usize,

    /// Tracks with at most this many features are labelled automatically
    #[serde(default = "default_label_density")]
    pub label_density: usize,

    /// Sub-feature fetches larger than this are not merged
    #[serde(default = "default_subfeature_cap")]
    pub subfeature_cap: usize,

    /// Tracks shown when a request names none
    #[serde(default)]
    pub default_tracks: Vec<String>,
}

fn default_zoom_levels() -> Vec<Position> {
    vec![100, 500, 1000, 5000, 10000, 25000, 100000, 200000, 400000]
}
fn default_max_segment() -> Position { 1_000_000 }
fn default_bump_density() -> usize { 50 }
fn default_label_density() -> usize { 10 }
fn default_subfeature_cap() -> usize { 5_000 }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database: None,
            automatic_classes: Vec::new(),
            zoom_levels: default_zoom_levels(),
            max_segment: default_max_segment(),
            bump_density: default_bump_density(),
            label_density: default_label_density(),
            subfeature_cap: default_subfeature_cap(),
            default_tracks: Vec::new(),
        }
    }
}

impl GeneralConfig {
    fn setting(&self, key: &str) -> Option<String> {
        match key {
            "database" => self.database.as_ref().map(|p| p.display().to_string()),
            "automatic_classes" => Some(self.automatic_classes.join(" ")),
            "zoom_levels" => Some(
                self.zoom_levels
                    .iter()
                    .map(|z| z.to_string())
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            "max_segment" => Some(self.max_segment.to_string()),
            "bump_density" => Some(self.bump_density.to_string()),
            "label_density" => Some(self.label_density.to_string()),
            "subfeature_cap" => Some(self.subfeature_cap.to_string()),
            "default_tracks" => Some(self.default_tracks.join(" ")),
            _ => None,
        }
    }
}

impl BrowserConfig {
    /// Look up `(stanza, option)` as whitespace-folded text
    pub fn setting(&self, stanza: &str, option: &str) -> Option<String> {
        let key = normalize_key(option);
        if stanza.eq_ignore_ascii_case(GENERAL) {
            return self.general.setting(&key);
        }
        self.tracks
            .get(stanza)?
            .iter()
            .find(|(k, _)| normalize_key(k) == key)
            .map(|(_, v)| v.as_text())
            .filter(|text| !text.is_empty())
    }

    /// Look up `(stanza, option)` split into whitespace-separated items
    pub fn setting_list(&self, stanza: &str, option: &str) -> Vec<String> {
        self.setting(stanza, option)
            .map(|text| text.split(' ').map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Integer setting; unparsable values are logged and ignored
    pub fn setting_int(&self, stanza: &str, option: &str) -> Option<i64> {
        let text = self.setting(stanza, option)?;
        match text.parse::<i64>() {
            Ok(n) => Some(n),
            Err(_) => {
                log::warn!("[{}] {} = {:?} is not an integer; ignoring", stanza, option, text);
                None
            }
        }
    }

    /// Boolean setting accepting `1/0`, `true/false`, `yes/no` and `on/off`
    pub fn setting_bool(&self, stanza: &str, option: &str) -> Option<bool> {
        let text = self.setting(stanza, option)?;
        match text.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => {
                log::warn!("[{}] {} = {:?} is not a boolean; ignoring", stanza, option, text);
                None
            }
        }
    }

    /// All configured track labels, zoom-qualified ones included, in sorted order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    pub fn has_track(&self, label: &str) -> bool {
        self.tracks.contains_key(label)
    }

    /// Feature types a track declares through its `feature` option
    pub fn track_features(&self, label: &str) -> Vec<String> {
        self.setting_list(label, "feature")
    }

    /// Whole-segment tracks never receive per-feature counts
    pub fn is_global_feature(&self, label: &str) -> bool {
        self.setting_bool(label, "global_feature").unwrap_or(false)
    }

    /// Distance used when merging the sub-features of an oversized location
    pub fn merge_distance(&self) -> Position {
        self.general
            .zoom_levels
            .last()
            .copied()
            .unwrap_or(self.general.max_segment)
    }

    /// Path of the feature database, required before any lookup can run
    pub fn database_path(&self) -> BrowseResult<&Path> {
        self.general
            .database
            .as_deref()
            .ok_or_else(|| BrowseError::config("no feature database configured (general.database)"))
    }

    /// Check settings that would otherwise fail deep inside a request
    pub fn validate(&self) -> BrowseResult<()> {
        if self.general.max_segment <= 0 {
            return Err(BrowseError::config("general.max_segment must be positive"));
        }
        if self.general.zoom_levels.iter().any(|z| *z < 0) {
            return Err(BrowseError::config("general.zoom_levels must be non-negative"));
        }
        if self.general.zoom_levels.windows(2).any(|w| w[0] > w[1]) {
            return Err(BrowseError::config("general.zoom_levels must be ascending"));
        }
        for label in self.tracks.keys() {
            if let Some((_, cutoff)) = label.rsplit_once(':') {
                if cutoff.parse::<u64>().is_err() {
                    return Err(BrowseError::config(format!(
                        "track label {:?} has a non-numeric zoom cutoff",
                        label
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> BrowseResult<Self> {
        let config: BrowserConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> BrowseResult<Self> {
        log::info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;

        // Relative database paths are taken relative to the config file
        if let (Some(db), Some(dir)) = (config.general.database.as_ref(), path.parent()) {
            if db.is_relative() {
                config.general.database = Some(dir.join(db));
            }
        }
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> BrowseResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// A small but complete configuration, handy as a starting point
    pub fn example() -> Self {
        let mut config = Self::default();
        config.general.database = Some(PathBuf::from("features.gff3"));
        config.general.automatic_classes = vec!["Sequence".to_string(), "gene".to_string()];
        config.general.default_tracks = vec!["Genes".to_string(), "Overview".to_string()];

        let mut genes = Stanza::new();
        genes.insert("feature".to_string(), SettingValue::List(vec!["gene".into(), "mRNA".into()]));
        genes.insert("key".to_string(), "Named genes".into());
        genes.insert("connector".to_string(), "solid".into());
        config.tracks.insert("Genes".to_string(), genes);

        let mut coarse = Stanza::new();
        coarse.insert("feature".to_string(), SettingValue::List(vec!["gene".into()]));
        coarse.insert("key".to_string(), "Gene density".into());
        coarse.insert("option".to_string(), SettingValue::Integer(1));
        config.tracks.insert("Genes:100000".to_string(), coarse);

        let mut overview = Stanza::new();
        overview.insert("feature".to_string(), "chromosome".into());
        overview.insert("global_feature".to_string(), true.into());
        overview.insert("key".to_string(), "Overview".into());
        config.tracks.insert("Overview".to_string(), overview);

        config
    }

    /// Generate example configuration file content
    pub fn example_toml() -> BrowseResult<String> {
        Ok(toml::to_string_pretty(&Self::example())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[general]
database = "/data/elegans.gff3"
automatic_classes = ["Sequence", "Clone"]
zoom_levels = [1000, 10000, 100000]

[tracks.Gene]
feature = """gene:curated
           mRNA"""
bump = true
feature_limit = 200

[tracks."Gene:50000"]
feature = ["gene:curated"]
label_density = "many"
"#;

    #[test]
    fn test_default_config() {
        let config = BrowserConfig::default();
        assert_eq!(config.general.max_segment, 1_000_000);
        assert_eq!(config.general.bump_density, 50);
        assert_eq!(config.general.label_density, 10);
        assert_eq!(config.merge_distance(), 400_000);
    }

    #[test]
    fn test_setting_folds_whitespace() {
        let config = BrowserConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.setting("Gene", "feature").as_deref(), Some("gene:curated mRNA"));
        assert_eq!(config.track_features("Gene"), vec!["gene:curated", "mRNA"]);
        assert_eq!(config.track_features("Gene:50000"), vec!["gene:curated"]);
    }

    #[test]
    fn test_typed_settings() {
        let config = BrowserConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.setting_bool("Gene", "bump"), Some(true));
        assert_eq!(config.setting_int("Gene", "feature limit"), Some(200));
        assert_eq!(config.setting_int("Gene:50000", "label_density"), None);
        assert_eq!(config.setting("general", "automatic classes").as_deref(), Some("Sequence Clone"));
        assert_eq!(config.merge_distance(), 100_000);
        assert!(config.setting("Missing", "feature").is_none());
    }

    #[test]
    fn test_missing_database_is_config_error() {
        let config = BrowserConfig::default();
        let err = config.database_path().unwrap_err();
        assert!(matches!(err, BrowseError::Config { .. }));
    }

    #[test]
    fn test_rejects_non_numeric_zoom_label() {
        let err = BrowserConfig::from_toml_str("[tracks.\"Gene:far\"]\nfeature = \"gene\"\n").unwrap_err();
        assert!(matches!(err, BrowseError::Config { .. }));
    }

    #[test]
    fn test_rejects_descending_zoom_levels() {
        let err = BrowserConfig::from_toml_str("[general]\nzoom_levels = [500, 100]\n").unwrap_err();
        assert!(matches!(err, BrowseError::Config { .. }));
    }

    #[test]
    fn test_config_roundtrip() -> BrowseResult<()> {
        let config = BrowserConfig::example();
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded = BrowserConfig::load_from_file(temp_file.path())?;

        assert_eq!(loaded.track_features("Genes"), vec!["gene", "mRNA"]);
        assert_eq!(loaded.setting_int("Genes:100000", "option"), Some(1));
        assert!(loaded.is_global_feature("Overview"));
        assert_eq!(loaded.general.automatic_classes, config.general.automatic_classes);
        Ok(())
    }

    #[test]
    fn test_example_toml_generation() {
        let example = BrowserConfig::example_toml().unwrap();
        assert!(example.contains("[general]"));
        assert!(example.contains("[tracks.Genes]"));
    }
}
