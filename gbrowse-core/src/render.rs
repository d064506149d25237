//! Render pass planning
//!
//! Assigns each feature of the displayed region to a semantic track label,
//! counts features per track, enforces per-track hard caps, and asks the
//! layout planner for each non-empty track's bump/label/connector policy.

use crate::config::{BrowserConfig, GENERAL};
use crate::labels::{base_label, feature_to_label, semantic_label, TypeIndex};
use crate::layout::{apply_feature_limit, limit_rng, plan, TrackCounts, TrackDecision, TrackOption};
use crate::types::{Feature, Position};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Per-request render inputs
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    /// Base labels of the tracks to draw; empty means every configured track
    pub tracks: Vec<String>,
    /// Option codes overriding each track's configured `option`
    pub options: HashMap<String, TrackOption>,
    /// Seed for the random drop applied by `feature_limit`
    pub seed: Option<u64>,
}

/// Layout outcome for one track
#[derive(Debug, Clone, Serialize)]
pub struct TrackPlan<F> {
    /// Semantic (possibly zoom-qualified) label the features resolved to
    pub label: String,
    pub feature_count: usize,
    /// Features removed by the hard cap
    pub dropped: usize,
    pub decision: TrackDecision,
    /// Connector name for the drawing stage
    pub connector: String,
    #[serde(skip)]
    pub features: Vec<F>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderPlan<F> {
    pub display_length: Position,
    pub tracks: Vec<TrackPlan<F>>,
}

/// Plans render passes against one configuration
pub struct RenderPlanner<'a> {
    config: &'a BrowserConfig,
    index: TypeIndex,
}

impl<'a> RenderPlanner<'a> {
    pub fn new(config: &'a BrowserConfig) -> Self {
        Self {
            config,
            index: TypeIndex::from_config(config),
        }
    }

    pub fn type_index(&self) -> &TypeIndex {
        &self.index
    }

    /// Plan one render pass. Tracks are returned in label order.
    pub fn plan<F: Feature>(&self, features: Vec<F>, display_length: Position, request: &RenderRequest) -> RenderPlan<F> {
        let selected: HashSet<&str> = request.tracks.iter().map(String::as_str).collect();

        let mut buckets: BTreeMap<String, Vec<F>> = BTreeMap::new();
        let mut counts = TrackCounts::new();
        for feature in features {
            let label = feature_to_label(&feature, display_length, &self.index);
            let base = base_label(&label);
            if !selected.is_empty() && !selected.contains(base) {
                continue;
            }
            if self.config.is_global_feature(&label) || self.config.is_global_feature(base) {
                continue;
            }
            counts.add(&label);
            buckets.entry(label).or_default().push(feature);
        }

        let mut rng = limit_rng(request.seed);
        let mut tracks = Vec::with_capacity(buckets.len());
        for (label, mut track_features) in buckets {
            let stanzas = self.stanza_chain(&label, display_length);
            let mut dropped = 0;
            if let Some(cap) = self.track_int(&stanzas, "feature_limit").filter(|cap| *cap > 0) {
                dropped = apply_feature_limit(&mut track_features, cap as usize, &mut rng);
                if dropped > 0 {
                    log::debug!("track {}: dropped {} features over limit {}", label, dropped, cap);
                    counts.set(&label, track_features.len());
                }
            }

            let count = counts.count(&label);
            let option = self.track_option(&label, &stanzas, request);
            let max_bump = self.density(&stanzas, "bump_density", self.config.general.bump_density);
            let max_label = self.density(&stanzas, "label_density", self.config.general.label_density);

            if let Some(decision) = plan(&label, count, option, max_bump, max_label) {
                let configured = stanzas.iter().find_map(|stanza| self.config.setting(stanza, "connector"));
                let connector = decision.connector.resolve(configured.as_deref()).to_string();
                tracks.push(TrackPlan {
                    label,
                    feature_count: count,
                    dropped,
                    decision,
                    connector,
                    features: track_features,
                });
            }
        }

        log::info!("planned {} tracks for {} bp ({} features)", tracks.len(), display_length, counts.total());
        RenderPlan { display_length, tracks }
    }

    /// Stanzas consulted for a track's settings, most specific first: the
    /// zoom stanza for `display_length`, the label the features resolved to,
    /// then the base stanza.
    fn stanza_chain(&self, label: &str, display_length: Position) -> Vec<String> {
        let base = base_label(label);
        let mut chain = vec![semantic_label(base, display_length, self.config)];
        for candidate in [label, base] {
            if !chain.iter().any(|s| s == candidate) {
                chain.push(candidate.to_string());
            }
        }
        chain
    }

    fn track_int(&self, stanzas: &[String], option: &str) -> Option<i64> {
        stanzas.iter().find_map(|stanza| self.config.setting_int(stanza, option))
    }

    fn track_option(&self, label: &str, stanzas: &[String], request: &RenderRequest) -> TrackOption {
        if let Some(option) = request.options.get(base_label(label)).or_else(|| request.options.get(label)) {
            return *option;
        }
        match self.track_int(stanzas, "option") {
            Some(code) => u8::try_from(code)
                .ok()
                .and_then(|c| TrackOption::try_from(c).ok())
                .unwrap_or_else(|| {
                    log::warn!("track {}: option {} out of range; using auto", label, code);
                    TrackOption::Auto
                }),
            None => TrackOption::Auto,
        }
    }

    fn density(&self, stanzas: &[String], option: &str, default: usize) -> usize {
        self.track_int(stanzas, option)
            .or_else(|| self.config.setting_int(GENERAL, option))
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(default)
    }
}
