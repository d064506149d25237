//! Span merging
//!
//! Collapses a scattered set of matched features into the smallest set of
//! contiguous display spans. Features are grouped per reference sequence and
//! each group is walked in coordinate order, opening a new span whenever the
//! next feature is too far from the running one.
//!
//! Small groups use `max_range` as the only distance threshold. Groups of
//! [`STATISTICAL_MIN_FEATURES`] or more also split on any gap of at least two
//! population standard deviations of the gap lengths, which finds natural
//! cluster boundaries when `max_range` is too coarse.

use crate::database::FeatureDatabase;
use crate::error::BrowseResult;
use crate::types::{MergeSpan, Position, RawFeature, Segment};
use std::collections::HashMap;

/// Minimum group size before gap statistics are trusted
pub const STATISTICAL_MIN_FEATURES: usize = 10;

/// Merge features into spans, grouped per reference in first-seen order
pub fn merge_spans(features: &[RawFeature], max_range: Position) -> Vec<MergeSpan> {
    let mut spans = Vec::new();
    for (seq_id, group) in group_by_reference(features) {
        let class = group.iter().find_map(|f| f.ref_class.clone());
        for (start, end) in merge_reference(group, max_range) {
            spans.push(MergeSpan {
                seq_id: seq_id.to_string(),
                class: class.clone(),
                start,
                end,
            });
        }
    }
    spans
}

/// Merge features and materialise the spans as segments.
///
/// With a database each span is requested back from it so the segment
/// carries the database's view of the region; without one (or when the
/// database has nothing for the span) a synthetic segment is built.
pub fn merge(
    features: &[RawFeature],
    max_range: Position,
    db: Option<&dyn FeatureDatabase>,
) -> BrowseResult<Vec<Segment>> {
    let spans = merge_spans(features, max_range);
    log::debug!("merged {} features into {} spans (max_range={})", features.len(), spans.len(), max_range);

    let Some(db) = db else {
        return Ok(spans.iter().map(MergeSpan::to_segment).collect());
    };

    let mut segments = Vec::with_capacity(spans.len());
    for span in &spans {
        let found = db.by_name_range(span.class.as_deref(), &span.seq_id, Some(span.start), Some(span.end))?;
        match found.into_iter().next() {
            Some(segment) => segments.push(segment),
            None => segments.push(span.to_segment()),
        }
    }
    Ok(segments)
}

fn group_by_reference(features: &[RawFeature]) -> Vec<(&str, Vec<&RawFeature>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&RawFeature>)> = Vec::new();
    for feature in features {
        let slot = *index.entry(feature.seq_id.as_str()).or_insert_with(|| {
            groups.push((feature.seq_id.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(feature);
    }
    groups
}

/// Merge one reference's features into `(start, end)` spans
fn merge_reference(mut features: Vec<&RawFeature>, max_range: Position) -> Vec<(Position, Position)> {
    // Stable sort: equal (low, high) keep their input order
    features.sort_by_key(|f| (f.low, f.high));

    let cutoff = statistical_cutoff(&features).unwrap_or(max_range as f64);

    let mut spans = Vec::new();
    let mut running: Option<(Position, Position)> = None;
    for feature in features {
        running = match running {
            Some((span_start, span_stop)) => {
                let gap = feature.low - span_stop;
                if gap >= max_range || span_stop - span_start >= max_range || gap as f64 >= cutoff {
                    spans.push((span_start, span_stop));
                    Some((feature.low, feature.high))
                } else {
                    Some((span_start, span_stop.max(feature.high)))
                }
            }
            None => Some((feature.low, feature.high)),
        };
    }
    if let Some(span) = running {
        spans.push(span);
    }
    spans
}

/// Twice the population standard deviation of consecutive gaps, or `None`
/// when the group is too small for the statistic to mean anything.
fn statistical_cutoff(sorted: &[&RawFeature]) -> Option<f64> {
    if sorted.len() < STATISTICAL_MIN_FEATURES {
        return None;
    }
    let gaps: Vec<f64> = sorted
        .windows(2)
        .map(|pair| (pair[1].low - pair[0].high) as f64)
        .collect();
    let n = gaps.len() as f64;
    let mean = gaps.iter().sum::<f64>() / n;
    let variance = gaps.iter().map(|g| (g - mean).powi(2)).sum::<f64>() / n;
    Some(2.0 * variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::InMemoryDatabase;

    fn feat(seq_id: &str, low: Position, high: Position) -> RawFeature {
        RawFeature::new(seq_id, low, high, "match", "hit")
    }

    fn bounds(spans: &[MergeSpan]) -> Vec<(Position, Position)> {
        spans.iter().map(|s| (s.start, s.end)).collect()
    }

    #[test]
    fn test_fixed_distance_split() {
        let features = vec![feat("chr1", 100, 200), feat("chr1", 5000, 5100), feat("chr1", 5200, 5300)];
        let spans = merge_spans(&features, 1000);
        assert_eq!(bounds(&spans), vec![(100, 200), (5000, 5300)]);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let features = vec![feat("chr1", 5200, 5300), feat("chr1", 100, 200), feat("chr1", 5000, 5100)];
        let spans = merge_spans(&features, 1000);
        assert_eq!(bounds(&spans), vec![(100, 200), (5000, 5300)]);
    }

    #[test]
    fn test_uniform_gaps_use_population_stdev() {
        // 12 features, 100bp long, exactly 50bp apart: stdev is 0 so every gap splits
        let features: Vec<_> = (0..12)
            .map(|i| feat("chr1", 1 + i * 150, 100 + i * 150))
            .collect();
        let spans = merge_spans(&features, 1_000_000);
        assert_eq!(spans.len(), 12);
    }

    #[test]
    fn test_statistics_find_cluster_boundary() {
        // two dense clusters of 6 separated by a 3kb gap; max_range alone would merge them
        let mut features = Vec::new();
        for i in 0..6 {
            features.push(feat("chr1", 1000 + i * 110, 1100 + i * 110));
            features.push(feat("chr1", 5000 + i * 110, 5100 + i * 110));
        }
        let spans = merge_spans(&features, 100_000);
        assert_eq!(bounds(&spans), vec![(1000, 1650), (5000, 5650)]);
    }

    #[test]
    fn test_overlapping_features_extend_not_shrink() {
        let features = vec![feat("chr1", 100, 1000), feat("chr1", 200, 300), feat("chr1", 900, 1200)];
        let spans = merge_spans(&features, 5000);
        assert_eq!(bounds(&spans), vec![(100, 1200)]);
    }

    #[test]
    fn test_span_length_cap_splits() {
        let features = vec![feat("chr1", 1, 900), feat("chr1", 950, 1900), feat("chr1", 1950, 2000)];
        let spans = merge_spans(&features, 1000);
        // after the second feature the span is 1899 long, so the third opens a new one
        assert_eq!(bounds(&spans), vec![(1, 1900), (1950, 2000)]);
    }

    #[test]
    fn test_references_are_merged_independently() {
        let features = vec![
            feat("chrII", 100, 200),
            feat("chrI", 100, 200),
            feat("chrII", 250, 300),
            feat("chrI", 90_000, 90_100),
        ];
        let spans = merge_spans(&features, 1000);
        let summary: Vec<_> = spans.iter().map(|s| (s.seq_id.as_str(), s.start, s.end)).collect();
        assert_eq!(
            summary,
            vec![("chrII", 100, 300), ("chrI", 100, 200), ("chrI", 90_000, 90_100)]
        );
    }

    #[test]
    fn test_contiguous_split_reassembles() {
        let features: Vec<_> = (0..5)
            .map(|i| feat("chrV", 1 + i * 2000, (i + 1) * 2000))
            .collect();
        let spans = merge_spans(&features, 20_000);
        assert_eq!(bounds(&spans), vec![(1, 10_000)]);
    }

    #[test]
    fn test_empty_input() {
        assert!(merge_spans(&[], 1000).is_empty());
    }

    #[test]
    fn test_synthetic_segments_without_database() {
        let features = vec![feat("chr1", 100, 200).with_ref_class("Sequence")];
        let segments = merge(&features, 1000, None).unwrap();
        assert_eq!(segments, vec![Segment::new("chr1", 100, 200).with_class("Sequence")]);
    }

    #[test]
    fn test_segments_requested_from_database() {
        let mut db = InMemoryDatabase::new();
        db.add_landmark("chr1", 1_000_000);
        let features = vec![feat("chr1", 100, 200), feat("chr1", 300, 400)];
        let segments = merge(&features, 1000, Some(&db)).unwrap();
        assert_eq!(segments, vec![Segment::new("chr1", 100, 400).with_class("Sequence")]);
    }
}
