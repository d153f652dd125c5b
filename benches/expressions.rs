//! Formula Evaluation Benchmarks
//!
//! Compares compiled formulas against hand-written Rust, and measures the one-time cost of
//! turning formula text into an artifact.
//!
//! ## Benchmark Structure
//!
//! ### 1. Evaluation (`benchmark_expressions`)
//! - **Direct**: Hand-written Rust functions computing the same values
//! - **Compiled**: Closure trees produced by the compiler, built during setup
//!
//! ### 2. Compilation Time (`benchmark_compilation_time`)
//! - **Compile**: Parse, fold and build from text, bypassing the cache
//! - **Cache hit**: Parse and look up a formula that is already cached
//!
//! ### 3. Sampling (`benchmark_sampling`)
//! Samples the default plot functions over an 800 pixel wide viewport, the work done for
//! one redraw.
//!
//! ## Usage
//!
//! Run with: `cargo bench --bench expressions`

use std::{f64::consts::PI, hint::black_box};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use plotexpr::prelude::*;

/// Formulas under test with their hand-written equivalents.
const CASES: [(&str, &str, fn(f64) -> f64); 8] = [
    ("simple_add", "x + 1.1", |x| x + 1.1),
    ("linear", "2.2*x + 1.1", |x| 2.2 * x + 1.1),
    ("folded_chain", "2*3*x*0.5 + 4/2", |x| 3.0 * x + 2.0),
    ("quadratic", "(2.2*x + 1.1) * 3.3", |x| (2.2 * x + 1.1) * 3.3),
    ("cubic", "x^3 + 2*x^2 - 5*x + 1", |x| x * x * x + 2.0 * x * x - 5.0 * x + 1.0),
    ("trig", "-(x^2)-sin(x*pi*8)", |x| -(x * x) - (x * PI * 8.0).sin()),
    ("sqrt_abs", "sqrt(abs(x)) + log(abs(x) + 1)", |x| {
        x.abs().sqrt() + (x.abs() + 1.0).log10()
    }),
    ("very_complex", "(x^3 - 2*x + 1) / ((x+1)*(x+2) + 1) + sqrt(abs(x)) - ln(x^2 + 1)", |x| {
        (x * x * x - 2.0 * x + 1.0) / ((x + 1.0) * (x + 2.0) + 1.0) + x.abs().sqrt()
            - (x * x + 1.0).ln()
    }),
];

/// Benchmarks evaluation performance of compiled formulas against direct Rust.
fn benchmark_expressions(c: &mut Criterion) {
    let cache = FunctionCache::new();
    let x = 2.5;

    let mut group = c.benchmark_group("Expression Evaluation");

    for (name, text, direct) in CASES {
        let artifact = cache
            .get_or_compile(&parse(text).expect("benchmark formula parses"))
            .expect("benchmark formula compiles");

        group.bench_with_input(BenchmarkId::new("Direct", name), &x, |b, &x| {
            b.iter(|| black_box(direct(black_box(x))))
        });

        group.bench_with_input(BenchmarkId::new("Compiled", name), &x, |b, &x| {
            b.iter(|| black_box(artifact.evaluate(black_box(x))))
        });
    }

    group.finish();
}

/// Benchmarks the cost of turning text into an artifact, with and without the cache.
fn benchmark_compilation_time(c: &mut Criterion) {
    let cache = FunctionCache::new();
    let mut group = c.benchmark_group("Compilation Time");

    for (name, text, _) in CASES {
        group.bench_with_input(BenchmarkId::new("Compile", name), &text, |b, text| {
            b.iter(|| {
                let expr = parse(black_box(text)).expect("benchmark formula parses");
                black_box(compile(&expr))
            })
        });

        cache
            .get_or_compile(&parse(text).expect("benchmark formula parses"))
            .expect("benchmark formula compiles");
        group.bench_with_input(BenchmarkId::new("Cache hit", name), &text, |b, text| {
            b.iter(|| {
                let expr = parse(black_box(text)).expect("benchmark formula parses");
                black_box(cache.get_or_compile(&expr))
            })
        });
    }

    group.finish();
}

/// Benchmarks sampling all visible functions for one redraw.
fn benchmark_sampling(c: &mut Criterion) {
    let cache = FunctionCache::new();
    let list = FunctionList::with_defaults(&cache).expect("default functions compile");
    let grid = SampleGrid::for_viewport(-5.0, 800, 1, 4.0);

    c.bench_function("Sample defaults (800px)", |b| {
        b.iter(|| black_box(list.sample_visible(black_box(&grid))))
    });
}

criterion_group!(
    benches,
    benchmark_expressions,
    benchmark_compilation_time,
    benchmark_sampling
);
criterion_main!(benches);
