use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gbrowse_core::{merge_spans, BrowserConfig, RawFeature, RenderPlanner, RenderRequest, SettingValue, Stanza};

/// Clustered hits: runs of ten close features separated by long gaps
fn generate_hits(count: usize) -> Vec<RawFeature> {
    (0..count as i64)
        .map(|i| {
            let cluster = i / 10;
            let low = cluster * 250_000 + (i % 10) * 700 + 1;
            let seq = if cluster % 2 == 0 { "chrI" } else { "chrII" };
            RawFeature::new(seq, low, low + 400, "match:BLAT", format!("hit{}", i))
        })
        .collect()
}

fn bench_merge_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_spans");

    for count in [100usize, 1_000, 5_000].iter() {
        let hits = generate_hits(*count);
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, _| {
            b.iter(|| black_box(merge_spans(black_box(&hits), 400_000)))
        });
    }

    group.finish();
}

fn bench_render_plan(c: &mut Criterion) {
    let mut config = BrowserConfig::default();
    let mut ests = Stanza::new();
    ests.insert("feature".to_string(), "match:BLAT".into());
    ests.insert("feature_limit".to_string(), SettingValue::Integer(500));
    config.tracks.insert("ESTs".to_string(), ests);
    let planner = RenderPlanner::new(&config);
    let hits = generate_hits(5_000);
    let request = RenderRequest { seed: Some(1), ..Default::default() };

    c.bench_function("render_plan_5000", |b| {
        b.iter(|| black_box(planner.plan(hits.clone(), 1_000_000, &request)))
    });
}

criterion_group!(benches, bench_merge_sizes, bench_render_plan);
criterion_main!(benches);
