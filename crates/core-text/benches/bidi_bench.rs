//! Bidi resolution throughput over representative shell lines.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use core_text::{shape, BaseLevel, BidiEngine, DisplayFormatter};

fn bench_resolve(c: &mut Criterion) {
    let engine = BidiEngine::new();
    let ascii: Vec<char> = "the quick brown fox jumps over the lazy dog 0123456789"
        .chars()
        .collect();
    let mixed: Vec<char> = "ls -la /tmp ثم اطبع مرحبا بالعالم 42 مرة # تعليق"
        .chars()
        .collect();

    c.bench_function("bidi_resolve_ascii", |b| {
        b.iter(|| engine.process(black_box(&ascii), BaseLevel::Auto))
    });
    c.bench_function("bidi_resolve_mixed", |b| {
        b.iter(|| engine.process(black_box(&mixed), BaseLevel::Auto))
    });
    c.bench_function("shape_mixed", |b| b.iter(|| shape(black_box(&mixed))));

    let formatter = DisplayFormatter::new();
    c.bench_function("format_line_mixed", |b| {
        b.iter(|| formatter.format_line(black_box("اطبع مرحبا > out.txt"), BaseLevel::Auto))
    });
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
