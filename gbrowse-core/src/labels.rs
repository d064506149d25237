//! Semantic zoom label resolution
//!
//! A track label may be qualified with a zoom cutoff, `"Gene:50000"`, meaning
//! the stanza applies once the displayed region is at least that long. When
//! several cutoffs qualify, the largest one wins; when none does, the plain
//! label applies.

use crate::config::BrowserConfig;
use crate::types::{Feature, Position};
use std::collections::HashMap;

/// Split `"Label:1000"` into `("Label", Some(1000))`
pub fn split_zoom_label(label: &str) -> (&str, Option<Position>) {
    match label.rsplit_once(':') {
        Some((base, cutoff)) if !cutoff.is_empty() && cutoff.bytes().all(|b| b.is_ascii_digit()) => {
            match cutoff.parse::<Position>() {
                Ok(n) => (base, Some(n)),
                Err(_) => (label, None),
            }
        }
        _ => (label, None),
    }
}

/// Base label with any zoom qualifier removed
pub fn base_label(label: &str) -> &str {
    split_zoom_label(label).0
}

/// Among labels qualified with cutoffs, pick the largest cutoff not above
/// `display_length`. Equal cutoffs keep the first candidate seen.
fn best_zoom_candidate<'a, I>(candidates: I, display_length: Position) -> Option<&'a str>
where
    I: IntoIterator<Item = (&'a str, Position)>,
{
    let mut best: Option<(&str, Position)> = None;
    for (label, cutoff) in candidates {
        if cutoff > display_length {
            continue;
        }
        if best.map_or(true, |(_, n)| cutoff > n) {
            best = Some((label, cutoff));
        }
    }
    best.map(|(label, _)| label)
}

/// Resolve the stanza that governs `label` at the given display length
pub fn semantic_label(label: &str, display_length: Position, config: &BrowserConfig) -> String {
    let candidates = config.labels().filter_map(|configured| match split_zoom_label(configured) {
        (base, Some(cutoff)) if base == label => Some((configured, cutoff)),
        _ => None,
    });
    best_zoom_candidate(candidates, display_length)
        .unwrap_or(label)
        .to_string()
}

/// Lower-cased feature type to the track labels declaring it.
///
/// Built once per configuration. Within each type the labels are kept in
/// lexicographic order, so when several unqualified labels declare the same
/// type the lexicographically first one is chosen.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    by_type: HashMap<String, Vec<String>>,
}

impl TypeIndex {
    pub fn from_config(config: &BrowserConfig) -> Self {
        let mut by_type: HashMap<String, Vec<String>> = HashMap::new();
        for label in config.labels() {
            for feature_type in config.track_features(label) {
                let entry = by_type.entry(feature_type.to_lowercase()).or_default();
                if !entry.iter().any(|l| l == label) {
                    entry.push(label.to_string());
                }
            }
        }
        for labels in by_type.values_mut() {
            labels.sort();
        }
        Self { by_type }
    }

    pub fn labels_for(&self, feature_type: &str) -> &[String] {
        self.by_type
            .get(&feature_type.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

/// Track label for a feature type at the given display length
pub fn type_to_label(feature_type: &str, display_length: Position, index: &TypeIndex) -> Option<String> {
    let candidates = index.labels_for(feature_type);

    let zoomed = candidates.iter().filter_map(|label| match split_zoom_label(label) {
        (_, Some(cutoff)) => Some((label.as_str(), cutoff)),
        (_, None) => None,
    });
    if let Some(label) = best_zoom_candidate(zoomed, display_length) {
        return Some(label.to_string());
    }

    candidates
        .iter()
        .find(|label| split_zoom_label(label).1.is_none())
        .cloned()
}

/// Track label for a feature, trying its full type, then its base type
/// (`method:source` reduced to `method`), then the raw type string itself.
pub fn feature_to_label<F: Feature + ?Sized>(feature: &F, display_length: Position, index: &TypeIndex) -> String {
    let feature_type = feature.feature_type();
    let base_type = feature_type.split_once(':').map_or(feature_type, |(base, _)| base);

    type_to_label(feature_type, display_length, index)
        .or_else(|| type_to_label(base_type, display_length, index))
        .unwrap_or_else(|| feature_type.to_string())
}
