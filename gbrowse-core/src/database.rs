//! Feature database capability
//!
//! The resolver only needs three lookups from a feature store. They are
//! expressed as the [`FeatureDatabase`] trait so any backend can be plugged
//! in; [`InMemoryDatabase`] is the bundled implementation, filled from a GFF3
//! file by the `gff` module or directly in tests.

use crate::error::{BrowseError, BrowseResult};
use crate::types::{Position, RawFeature, Segment};
use regex::RegexBuilder;

pub trait FeatureDatabase {
    /// Exact (case-insensitive) name lookup, optionally restricted to a class
    /// and narrowed to a 1-based `start..stop` range relative to each match.
    fn by_name_range(
        &self,
        class: Option<&str>,
        name: &str,
        start: Option<Position>,
        stop: Option<Position>,
    ) -> BrowseResult<Vec<Segment>>;

    /// Like [`by_name_range`](Self::by_name_range) but `*` in the pattern
    /// matches any run of characters.
    fn by_wildcard_name(
        &self,
        class: Option<&str>,
        pattern: &str,
        start: Option<Position>,
        stop: Option<Position>,
    ) -> BrowseResult<Vec<Segment>>;

    /// Every feature carrying `name`, as raw records suitable for merging
    fn fetch_subfeatures_by_name(&self, class: Option<&str>, name: &str) -> BrowseResult<Vec<RawFeature>>;
}

/// A named record held by [`InMemoryDatabase`]
#[derive(Debug, Clone)]
pub struct NamedFeature {
    pub class: String,
    pub names: Vec<String>,
    pub feature: RawFeature,
    /// Reference sequence record rather than an annotation
    pub landmark: bool,
}

impl NamedFeature {
    fn matches_class(&self, class: Option<&str>) -> bool {
        class.map_or(true, |c| self.class.eq_ignore_ascii_case(c))
    }

    fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    /// Segment covering this feature, optionally narrowed to a relative range
    fn segment(&self, start: Option<Position>, stop: Option<Position>) -> BrowseResult<Segment> {
        let origin = self.feature.low;
        let offset = |relative: Position| {
            origin
                .checked_add(relative)
                .and_then(|p| p.checked_sub(1))
                .ok_or_else(|| BrowseError::invalid_input(format!("coordinate {} is out of range", relative)))
        };
        let seg_start = match start {
            Some(s) => offset(s)?,
            None => self.feature.low,
        };
        let seg_end = match stop {
            Some(e) => offset(e)?,
            None => self.feature.high,
        };
        Ok(Segment::new(self.feature.seq_id.clone(), seg_start, seg_end).with_class(self.class.clone()))
    }
}

/// Feature store backed by a flat vector; records keep insertion order so
/// repeated lookups return identically ordered results.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDatabase {
    records: Vec<NamedFeature>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    /// Register a feature under its own name plus any aliases
    pub fn add_feature<S: Into<String>>(&mut self, class: S, feature: RawFeature, aliases: &[&str]) {
        let mut names = vec![feature.name.clone()];
        for alias in aliases {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(alias)) {
                names.push(alias.to_string());
            }
        }
        self.records.push(NamedFeature {
            class: class.into(),
            names,
            feature,
            landmark: false,
        });
    }

    /// Register a reference sequence of the given length under class `Sequence`
    pub fn add_landmark<S: Into<String>>(&mut self, name: S, length: Position) {
        self.add_landmark_range(name, 1, length);
    }

    /// Reference sequence covering `start..=end` in its own coordinates
    pub fn add_landmark_range<S: Into<String>>(&mut self, name: S, start: Position, end: Position) {
        let name = name.into();
        let feature = RawFeature::new(name.clone(), start, end, "region", name.clone())
            .with_ref_class("Sequence");
        self.records.push(NamedFeature {
            class: "Sequence".to_string(),
            names: vec![name],
            feature,
            landmark: true,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[NamedFeature] {
        &self.records
    }

    /// Features (landmarks excluded) overlapping a segment, for the render stage
    pub fn features_overlapping(&self, segment: &Segment) -> Vec<RawFeature> {
        self.records
            .iter()
            .filter(|r| !r.landmark)
            .filter(|r| segment.overlaps(&r.feature.seq_id, r.feature.low, r.feature.high))
            .map(|r| r.feature.clone())
            .collect()
    }
}

impl FeatureDatabase for InMemoryDatabase {
    fn by_name_range(
        &self,
        class: Option<&str>,
        name: &str,
        start: Option<Position>,
        stop: Option<Position>,
    ) -> BrowseResult<Vec<Segment>> {
        self
            .records
            .iter()
            .filter(|r| r.matches_class(class) && r.has_name(name))
            .map(|r| r.segment(start, stop))
            .collect()
    }

    fn by_wildcard_name(
        &self,
        class: Option<&str>,
        pattern: &str,
        start: Option<Position>,
        stop: Option<Position>,
    ) -> BrowseResult<Vec<Segment>> {
        let regex = glob_to_regex(pattern)?;
        self
            .records
            .iter()
            .filter(|r| r.matches_class(class) && r.names.iter().any(|n| regex.is_match(n)))
            .map(|r| r.segment(start, stop))
            .collect()
    }

    fn fetch_subfeatures_by_name(&self, class: Option<&str>, name: &str) -> BrowseResult<Vec<RawFeature>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.matches_class(class) && r.has_name(name))
            .map(|r| r.feature.clone())
            .collect())
    }
}

fn glob_to_regex(pattern: &str) -> BrowseResult<regex::Regex> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Ok(RegexBuilder::new(&format!("^{}$", body))
        .case_insensitive(true)
        .build()?)
}
