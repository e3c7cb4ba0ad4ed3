//! Benchmarks for text sanitization, batch cleaning and dedup keys.
//!
//! Benchmark targets:
//! - Sanitizing a short headline: <50us
//! - Sanitizing a 4 KB markup body: <1ms
//! - Cleaning a 100-record batch: <20ms

// Criterion macros generate items without docs - this is expected for benchmarks
#![allow(missing_docs)]
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::print_stderr)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;

use newsflow::clean::timestamp::normalize_timestamp;
use newsflow::state::id_for;
use newsflow::{NewsRecord, RecordCleaner, TextSanitizer};
use serde_json::json;

// ============================================================================
// Inputs
// ============================================================================

const HEADLINE: &str = "  Markets <b>rally</b> &amp; close higher  ";
const PARAGRAPH: &str = "<p class=\"lead\">Shares rose on Tuesday after the \
    central bank held rates steady, see https://example.com/markets?id=42 for \
    details.&nbsp;Analysts expect\tfurther\n\ngains.</p>";

fn markup_body(paragraphs: usize) -> String {
    (0..paragraphs)
        .map(|i| format!("<div><h2>Section {i}</h2>{PARAGRAPH}<br/></div>"))
        .collect()
}

fn batch(size: usize) -> Vec<NewsRecord> {
    (0..size)
        .map(|i| NewsRecord {
            title: Some(format!("<h1>Headline number {i}</h1>")),
            content: Some(markup_body(3)),
            publish_time: Some("2023/07/01 08:00".to_string()),
            source: Some("wire".to_string()),
            ..NewsRecord::default()
        })
        .collect()
}

// ============================================================================
// Sanitizer Benchmarks
// ============================================================================

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");

    group.bench_function("headline", |b| {
        b.iter(|| TextSanitizer::clean(black_box(HEADLINE)));
    });

    group.bench_function("paragraph", |b| {
        b.iter(|| TextSanitizer::clean(black_box(PARAGRAPH)));
    });

    for paragraphs in [4, 16, 64] {
        let body = markup_body(paragraphs);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::new("body", paragraphs), &body, |b, body| {
            b.iter(|| TextSanitizer::clean(black_box(body)));
        });
    }

    group.finish();
}

// ============================================================================
// Cleaner Benchmarks
// ============================================================================

fn bench_clean_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean_batch");
    let cleaner = RecordCleaner::new();

    for size in [10, 100] {
        let records = batch(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| cleaner.clean(black_box(records.clone())));
        });
    }

    group.finish();
}

fn bench_timestamps(c: &mut Criterion) {
    let mut group = c.benchmark_group("timestamps");

    for (name, raw) in [
        ("canonical", "2023-07-01 08:00:00"),
        ("slashes", "2023/07/01 08:00"),
        ("date_only", "2023-07-01"),
        ("unparsable", "yesterday morning"),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| normalize_timestamp(black_box(raw)));
        });
    }

    group.finish();
}

// ============================================================================
// Dedup Benchmarks
// ============================================================================

fn bench_dedup_key(c: &mut Criterion) {
    let record = json!({
        "id": 7,
        "title": "Markets rally and close higher",
        "content": TextSanitizer::clean(&markup_body(4)),
        "source": "wire",
    });

    c.bench_function("dedup_key", |b| {
        b.iter(|| id_for(black_box(&record)));
    });
}

criterion_group!(
    benches,
    bench_sanitize,
    bench_clean_batch,
    bench_timestamps,
    bench_dedup_key,
);

criterion_main!(benches);
