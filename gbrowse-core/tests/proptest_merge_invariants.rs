//! Property-based invariant tests for span merging and location parsing.
//!
//! 1. Every input feature lies inside an output span of its reference.
//! 2. Spans of one reference come out ordered by start.
//! 3. Input order does not change the result.
//! 4. A span cut into abutting pieces reassembles into the original span.
//! 5. Comma and dash range syntax parse identically.

use gbrowse_core::{merge_spans, parse_location, MergeSpan, RawFeature};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn feature_strategy() -> impl Strategy<Value = RawFeature> {
    (prop_oneof![Just("chrI"), Just("chrII"), Just("chrX")], 1i64..200_000, 0i64..5_000)
        .prop_map(|(seq, low, len)| RawFeature::new(seq, low, low + len, "match", "hit"))
}

fn feature_list() -> impl Strategy<Value = Vec<RawFeature>> {
    proptest::collection::vec(feature_strategy(), 1..40)
}

fn spans_on<'a>(spans: &'a [MergeSpan], seq_id: &'a str) -> impl Iterator<Item = &'a MergeSpan> + 'a {
    spans.iter().filter(move |s| s.seq_id == seq_id)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Coverage
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn every_feature_is_covered(features in feature_list(), max_range in 1i64..50_000) {
        let spans = merge_spans(&features, max_range);
        for f in &features {
            let covering = spans_on(&spans, &f.seq_id)
                .filter(|s| s.start <= f.low && f.high <= s.end)
                .count();
            prop_assert!(covering >= 1, "feature {}..{} on {} not covered", f.low, f.high, f.seq_id);
        }
        prop_assert!(spans.len() <= features.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Ordering within a reference
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn spans_are_ordered_per_reference(features in feature_list(), max_range in 1i64..50_000) {
        let spans = merge_spans(&features, max_range);
        for seq_id in ["chrI", "chrII", "chrX"] {
            let on_seq: Vec<_> = spans_on(&spans, seq_id).collect();
            for span in &on_seq {
                prop_assert!(span.start <= span.end);
            }
            for pair in on_seq.windows(2) {
                prop_assert!(pair[0].start <= pair[1].start);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Input order independence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn reversed_input_gives_same_spans_per_reference(features in feature_list(), max_range in 1i64..50_000) {
        let forward = merge_spans(&features, max_range);
        let reversed_input: Vec<_> = features.iter().rev().cloned().collect();
        let backward = merge_spans(&reversed_input, max_range);

        for seq_id in ["chrI", "chrII", "chrX"] {
            let a: Vec<_> = spans_on(&forward, seq_id).map(|s| (s.start, s.end)).collect();
            let b: Vec<_> = spans_on(&backward, seq_id).map(|s| (s.start, s.end)).collect();
            prop_assert_eq!(a, b);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Reassembly of abutting pieces
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn abutting_pieces_reassemble(
        start in 1i64..1_000_000,
        pieces in 1usize..9,
        max_range in 10_001i64..5_000_000,
    ) {
        let piece_len = 10_000 / pieces as i64;
        let features: Vec<_> = (0..pieces as i64)
            .map(|i| {
                let low = start + i * piece_len;
                RawFeature::new("chrI", low, low + piece_len - 1, "exon", "split")
            })
            .collect();

        let spans = merge_spans(&features, max_range);
        prop_assert_eq!(spans.len(), 1);
        prop_assert_eq!(spans[0].start, start);
        prop_assert_eq!(spans[0].end, start + pieces as i64 * piece_len - 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Range syntax equivalence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn comma_and_dash_ranges_agree(
        name in "[A-Za-z][A-Za-z0-9_.]{0,12}",
        start in 0i64..100_000_000,
        stop in 0i64..100_000_000,
    ) {
        let comma = parse_location(&format!("{}:{},{}", name, start, stop)).unwrap();
        let dash = parse_location(&format!("{}:{}-{}", name, start, stop)).unwrap();
        let dots = parse_location(&format!("{}:{}..{}", name, start, stop)).unwrap();
        prop_assert_eq!(&comma, &dash);
        prop_assert_eq!(&comma, &dots);
        prop_assert_eq!(comma.name, name);
        prop_assert_eq!(comma.start, Some(start));
        prop_assert_eq!(comma.stop, Some(stop));
    }
}
