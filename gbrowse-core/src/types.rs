//! Unified coordinate and feature types

use serde::{Deserialize, Serialize};

/// 1-based, inclusive genomic coordinate
pub type Position = i64;

/// A resolved coordinate range on one reference sequence.
///
/// `end < start` encodes reverse orientation. Segments are immutable once
/// built; use the accessors to read them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    seq_id: String,
    start: Position,
    end: Position,
    class: Option<String>,
}

impl Segment {
    pub fn new<S: Into<String>>(seq_id: S, start: Position, end: Position) -> Self {
        Self {
            seq_id: seq_id.into(),
            start,
            end,
            class: None,
        }
    }

    pub fn with_class<S: Into<String>>(mut self, class: S) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn seq_id(&self) -> &str {
        &self.seq_id
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub fn low(&self) -> Position {
        self.start.min(self.end)
    }

    pub fn high(&self) -> Position {
        self.start.max(self.end)
    }

    /// Inclusive length, saturating at the `Position` bounds
    pub fn length(&self) -> Position {
        self.high().saturating_sub(self.low()).saturating_add(1)
    }

    pub fn is_reverse(&self) -> bool {
        self.end < self.start
    }

    pub fn overlaps(&self, seq_id: &str, low: Position, high: Position) -> bool {
        self.seq_id == seq_id && low <= self.high() && self.low() <= high
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}..{}", self.seq_id, self.start, self.end)
    }
}

/// Accessors every feature record must provide before it reaches the core.
pub trait Feature {
    /// Reference sequence the feature lives on
    fn seq_id(&self) -> &str;
    fn low(&self) -> Position;
    fn high(&self) -> Position;
    /// `method` or `method:source` type string
    fn feature_type(&self) -> &str;
    fn name(&self) -> &str;
}

/// Canonical feature record consumed by the merger and the render planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFeature {
    pub seq_id: String,
    pub low: Position,
    pub high: Position,
    pub feature_type: String,
    pub name: String,
    /// Class of the reference sequence, carried onto merged segments
    pub ref_class: Option<String>,
}

impl RawFeature {
    /// Build from stranded coordinates; low/high are normalised.
    pub fn new<S, T, N>(seq_id: S, start: Position, end: Position, feature_type: T, name: N) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        N: Into<String>,
    {
        Self {
            seq_id: seq_id.into(),
            low: start.min(end),
            high: start.max(end),
            feature_type: feature_type.into(),
            name: name.into(),
            ref_class: None,
        }
    }

    pub fn with_ref_class<S: Into<String>>(mut self, class: S) -> Self {
        self.ref_class = Some(class.into());
        self
    }

    /// Wrap any other feature source into the canonical record
    pub fn from_feature<F: Feature + ?Sized>(feature: &F) -> Self {
        Self::new(
            feature.seq_id(),
            feature.low(),
            feature.high(),
            feature.feature_type(),
            feature.name(),
        )
    }

    pub fn length(&self) -> Position {
        self.high.saturating_sub(self.low).saturating_add(1)
    }
}

impl Feature for RawFeature {
    fn seq_id(&self) -> &str {
        &self.seq_id
    }

    fn low(&self) -> Position {
        self.low
    }

    fn high(&self) -> Position {
        self.high
    }

    fn feature_type(&self) -> &str {
        &self.feature_type
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A contiguous clustered range on one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSpan {
    pub seq_id: String,
    pub class: Option<String>,
    pub start: Position,
    pub end: Position,
}

impl MergeSpan {
    pub fn length(&self) -> Position {
        self.end.saturating_sub(self.start).saturating_add(1)
    }

    /// Synthetic segment for callers without a live database
    pub fn to_segment(&self) -> Segment {
        let segment = Segment::new(self.seq_id.clone(), self.start, self.end);
        match &self.class {
            Some(class) => segment.with_class(class.clone()),
            None => segment,
        }
    }
}
