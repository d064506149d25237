//! Per-track bump, label and connector policy
//!
//! Once a render pass knows how many features each track received, every
//! non-empty track gets a [`TrackDecision`] from its [`TrackOption`] code and
//! the bump/label density thresholds.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Caller-selected layout policy, codes 0 through 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TrackOption {
    /// Decide from feature density
    #[default]
    Auto,
    Compact,
    Expand,
    ExpandLabel,
    FastExpand,
    FastExpandLabel,
}

impl TryFrom<u8> for TrackOption {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TrackOption::Auto),
            1 => Ok(TrackOption::Compact),
            2 => Ok(TrackOption::Expand),
            3 => Ok(TrackOption::ExpandLabel),
            4 => Ok(TrackOption::FastExpand),
            5 => Ok(TrackOption::FastExpandLabel),
            other => Err(format!("track option must be 0-5, got {}", other)),
        }
    }
}

impl From<TrackOption> for u8 {
    fn from(option: TrackOption) -> Self {
        match option {
            TrackOption::Auto => 0,
            TrackOption::Compact => 1,
            TrackOption::Expand => 2,
            TrackOption::ExpandLabel => 3,
            TrackOption::FastExpand => 4,
            TrackOption::FastExpandLabel => 5,
        }
    }
}

/// How overlapping features are separated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BumpMode {
    Off,
    On,
    /// Bumped with the reduced-cost layout
    Fast,
}

impl BumpMode {
    pub fn is_bumped(self) -> bool {
        !matches!(self, BumpMode::Off)
    }
}

/// Whether a track keeps its configured connector or draws none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    Configured,
    None,
}

impl Connector {
    /// Connector name to hand to the drawing stage
    pub fn resolve<'a>(self, configured: Option<&'a str>) -> &'a str {
        match self {
            Connector::Configured => configured.unwrap_or(CONNECTOR_NONE),
            Connector::None => CONNECTOR_NONE,
        }
    }
}

pub const CONNECTOR_NONE: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDecision {
    pub bump: BumpMode,
    pub label: bool,
    pub connector: Connector,
}

impl fmt::Display for TrackDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bump={:?} label={} connector={:?}", self.bump, self.label, self.connector)
    }
}

/// Decide layout for one track.
///
/// Returns `None` for a track with no features; the caller keeps whatever
/// settings that track already had.
pub fn plan(
    track_label: &str,
    feature_count: usize,
    option: TrackOption,
    max_bump: usize,
    max_label: usize,
) -> Option<TrackDecision> {
    if feature_count == 0 {
        return None;
    }

    let (bump, label) = match option {
        TrackOption::Auto => {
            let bump = if feature_count <= max_bump { BumpMode::On } else { BumpMode::Off };
            (bump, feature_count <= max_label)
        }
        TrackOption::Compact => (BumpMode::Off, false),
        TrackOption::Expand => (BumpMode::On, false),
        TrackOption::ExpandLabel => (BumpMode::On, true),
        TrackOption::FastExpand => (BumpMode::Fast, false),
        TrackOption::FastExpandLabel => (BumpMode::Fast, true),
    };
    let connector = if bump.is_bumped() { Connector::Configured } else { Connector::None };

    let decision = TrackDecision { bump, label, connector };
    log::debug!("track {} ({} features, {:?}): {}", track_label, feature_count, option, decision);
    Some(decision)
}

/// Feature counts for a single render pass
#[derive(Debug, Clone, Default)]
pub struct TrackCounts {
    counts: BTreeMap<String, usize>,
}

impl TrackCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str) {
        *self.counts.entry(label.to_string()).or_insert(0) += 1;
    }

    /// Overwrite a count, used once a hard cap has trimmed a track
    pub fn set(&mut self, label: &str, count: usize) {
        self.counts.insert(label.to_string(), count);
    }

    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Drop randomly chosen items until at most `cap` remain, keeping the
/// survivors in their original order. Returns how many were dropped.
pub fn apply_feature_limit<T, R: Rng + ?Sized>(items: &mut Vec<T>, cap: usize, rng: &mut R) -> usize {
    if items.len() <= cap {
        return 0;
    }
    let dropped = items.len() - cap;
    let mut keep = vec![false; items.len()];
    for i in sample(rng, items.len(), cap).into_iter() {
        keep[i] = true;
    }
    let mut flags = keep.into_iter();
    items.retain(|_| flags.next().unwrap_or(false));
    dropped
}

/// RNG for feature capping; seeded runs are reproducible
pub fn limit_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
