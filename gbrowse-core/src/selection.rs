//! Track and data-source selection
//!
//! Unknown names in a request are not errors: they are logged and the
//! previous valid selection is kept.

use crate::config::BrowserConfig;
use crate::labels::base_label;

/// Keep the requested tracks that exist in the configuration.
///
/// Zoom-qualified labels are reduced to their base label. If nothing valid
/// remains, `previous` is returned unchanged.
pub fn select_tracks(requested: &[String], config: &BrowserConfig, previous: &[String]) -> Vec<String> {
    let mut selected: Vec<String> = Vec::new();
    for label in requested {
        let base = base_label(label);
        if !config.has_track(base) {
            log::warn!("ignoring unknown track {:?}", label);
            continue;
        }
        if !selected.iter().any(|s| s == base) {
            selected.push(base.to_string());
        }
    }

    if selected.is_empty() && !requested.is_empty() {
        log::warn!("no valid tracks requested; keeping previous selection");
        return previous.to_vec();
    }
    selected
}

/// Switch to `requested` if it names an available source, else keep `previous`
pub fn select_source<'a>(requested: &str, available: &[&'a str], previous: &'a str) -> &'a str {
    match available.iter().find(|s| **s == requested) {
        Some(source) => *source,
        None => {
            log::warn!("unknown source {:?}; keeping {:?}", requested, previous);
            previous
        }
    }
}

/// Tracks to draw when a request names none: `default_tracks` if set,
/// otherwise every configured base label.
pub fn default_tracks(config: &BrowserConfig) -> Vec<String> {
    if !config.general.default_tracks.is_empty() {
        return select_tracks(&config.general.default_tracks, config, &[]);
    }
    let mut labels: Vec<String> = Vec::new();
    for label in config.labels() {
        let base = base_label(label);
        if !labels.iter().any(|l| l == base) {
            labels.push(base.to_string());
        }
    }
    labels
}
