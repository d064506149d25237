//! Location resolution
//!
//! Turns a user location string into concrete segments. An explicit
//! wildcard query goes straight to the wildcard lookup. Otherwise a fixed
//! chain of naming heuristics runs until something matches:
//!
//! 1. direct lookup of the parsed class/name/range
//! 2. bare chromosome tokens (`2`, `IV`, `2L`) retried as `CHROMOSOME_2`, `Chr2`, `chr2`
//! 3. chromosome-style prefixes (`chr`, `chromosome`, `chromosome_`) stripped
//! 4. names longer than three characters retried as `name*`
//! 5. each automatic class tried with `name`, then `name*`
//!
//! A result that is ambiguous (several segments) or oversized is replaced by
//! merging the name's sub-features, when there are a sensible number of them.

use crate::config::BrowserConfig;
use crate::database::FeatureDatabase;
use crate::error::BrowseResult;
use crate::location::{parse_location, LocationQuery};
use crate::merger;
use crate::types::{Position, Segment};
use regex::Regex;
use std::sync::OnceLock;

/// Prefixes tried, in order, in front of a bare chromosome token
pub const CHROMOSOME_PREFIXES: [&str; 3] = ["CHROMOSOME_", "Chr", "chr"];

/// Names no longer than this are never widened with a trailing wildcard
const MIN_WILDCARD_NAME_LEN: usize = 3;

/// Resolves location strings against one database and configuration
pub struct SegmentResolver<'a> {
    db: &'a dyn FeatureDatabase,
    config: &'a BrowserConfig,
}

/// What produced the current result, needed for the merge step
struct Hit {
    class: Option<String>,
    name: String,
    wildcard: bool,
}

impl<'a> SegmentResolver<'a> {
    pub fn new(db: &'a dyn FeatureDatabase, config: &'a BrowserConfig) -> Self {
        Self { db, config }
    }

    /// Resolve a location string. No match is an empty vector, not an error.
    pub fn resolve(&self, location_text: &str) -> BrowseResult<Vec<Segment>> {
        let query = parse_location(location_text)?;
        self.resolve_query(&query)
    }

    pub fn resolve_query(&self, query: &LocationQuery) -> BrowseResult<Vec<Segment>> {
        let class = query.class.as_deref();
        let (start, stop) = (query.start, query.stop);

        if query.is_wildcard() {
            log::debug!("wildcard lookup for {:?}", query.name);
            return self.db.by_wildcard_name(class, &query.name, start, stop);
        }

        let (segments, hit) = self.lookup_with_fallbacks(query)?;
        if segments.is_empty() {
            log::debug!("no match for {:?}", query.name);
            return Ok(segments);
        }
        if hit.wildcard || !self.needs_merge(&segments) {
            return Ok(segments);
        }
        self.merge_subfeatures(segments, &hit)
    }

    fn lookup_with_fallbacks(&self, query: &LocationQuery) -> BrowseResult<(Vec<Segment>, Hit)> {
        let class = query.class.as_deref();
        let (start, stop) = (query.start, query.stop);
        let mut name = query.name.clone();

        let segments = self.db.by_name_range(class, &name, start, stop)?;
        if !segments.is_empty() {
            return Ok((segments, Hit { class: query.class.clone(), name, wildcard: false }));
        }

        if is_bare_chromosome_token(&name) {
            for prefix in CHROMOSOME_PREFIXES {
                let candidate = format!("{}{}", prefix, name);
                log::debug!("retrying {:?} as {:?}", name, candidate);
                let segments = self.db.by_name_range(class, &candidate, start, stop)?;
                if !segments.is_empty() {
                    return Ok((segments, Hit { class: query.class.clone(), name: candidate, wildcard: false }));
                }
            }
        }

        if let Some(stripped) = strip_chromosome_prefix(&name) {
            log::debug!("retrying {:?} without its chromosome prefix", name);
            name = stripped.to_string();
            let segments = self.db.by_name_range(None, &name, start, stop)?;
            if !segments.is_empty() {
                return Ok((segments, Hit { class: None, name, wildcard: false }));
            }
        }

        if name.len() > MIN_WILDCARD_NAME_LEN {
            let pattern = format!("{}*", name);
            log::debug!("retrying as wildcard {:?}", pattern);
            let segments = self.db.by_wildcard_name(class, &pattern, start, stop)?;
            if !segments.is_empty() {
                return Ok((segments, Hit { class: query.class.clone(), name: pattern, wildcard: true }));
            }
        }

        for auto_class in &self.config.general.automatic_classes {
            log::debug!("trying automatic class {:?} for {:?}", auto_class, name);
            let segments = self.db.by_name_range(Some(auto_class.as_str()), &name, start, stop)?;
            if !segments.is_empty() {
                return Ok((segments, Hit { class: Some(auto_class.clone()), name, wildcard: false }));
            }
            if name.len() > MIN_WILDCARD_NAME_LEN {
                let pattern = format!("{}*", name);
                let segments = self.db.by_wildcard_name(Some(auto_class.as_str()), &pattern, start, stop)?;
                if !segments.is_empty() {
                    return Ok((segments, Hit { class: Some(auto_class.clone()), name: pattern, wildcard: true }));
                }
            }
        }

        Ok((Vec::new(), Hit { class: query.class.clone(), name, wildcard: false }))
    }

    fn needs_merge(&self, segments: &[Segment]) -> bool {
        let max_segment: Position = self.config.general.max_segment;
        segments.len() > 1 || segments.iter().any(|s| s.length() > max_segment)
    }

    fn merge_subfeatures(&self, segments: Vec<Segment>, hit: &Hit) -> BrowseResult<Vec<Segment>> {
        let features = self.db.fetch_subfeatures_by_name(hit.class.as_deref(), &hit.name)?;
        let cap = self.config.general.subfeature_cap;
        if features.len() < 2 || features.len() > cap {
            log::debug!("{} sub-features for {:?}; keeping {} segments", features.len(), hit.name, segments.len());
            return Ok(segments);
        }

        let distance = self.config.merge_distance();
        let merged = merger::merge(&features, distance, Some(self.db))?;
        log::info!(
            "merged {} sub-features of {:?} into {} segments (distance {})",
            features.len(),
            hit.name,
            merged.len(),
            distance
        );
        Ok(merged)
    }
}

/// Resolve `location_text` against `db` using `config`
pub fn resolve(location_text: &str, db: &dyn FeatureDatabase, config: &BrowserConfig) -> BrowseResult<Vec<Segment>> {
    SegmentResolver::new(db, config).resolve(location_text)
}

/// A bare alphanumeric chromosome token such as `2`, `IV` or `2L`
fn is_bare_chromosome_token(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn chromosome_prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^(?:chromosome_?|chr)(.+)$").expect("valid regex"))
}

fn strip_chromosome_prefix(name: &str) -> Option<&str> {
    chromosome_prefix_pattern()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
