//! Performance benchmarks for escheck
//!
//! Run with: cargo bench
//!
//! Measures module generation over a synthetic suite, with and without
//! minification, and path filtering on its own.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use escheck::codegen::{self, GenerateOptions};
use escheck::data::{TestDefinition, TestSuite};
use escheck::filter::PathFilter;

/// `groups` feature groups of `leaves` tests each, spread over four categories.
fn synthetic_suite(groups: usize, leaves: usize) -> TestSuite {
    let features = (0..groups)
        .map(|g| {
            let tests = (0..leaves)
                .map(|t| {
                    TestDefinition::leaf(
                        format!("case {} of feature {}", t, g),
                        format!(
                            "function () {{\n  var value = {};\n  var passed = value === {};\n  return passed;\n}}",
                            t, t
                        ),
                    )
                })
                .collect();
            TestDefinition::group(format!("feature {}", g), tests)
                .with_category(format!("category {}", g % 4))
        })
        .collect();
    TestSuite::from_roots(vec![TestDefinition::group("es6", features)]).unwrap()
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for &size in &[10usize, 50, 200] {
        let suite = synthetic_suite(size, 8);
        group.throughput(Throughput::Elements(suite.leaf_count() as u64));
        group.bench_with_input(BenchmarkId::new("plain", size), &suite, |b, suite| {
            let options = GenerateOptions::default();
            b.iter(|| codegen::generate(black_box(suite), &options))
        });
    }
    group.finish();
}

fn bench_generate_minified(c: &mut Criterion) {
    let suite = synthetic_suite(20, 8);
    let options = GenerateOptions {
        minify: true,
        ..Default::default()
    };
    c.bench_function("generate_minified", |b| {
        b.iter(|| codegen::generate(black_box(&suite), &options))
    });
}

fn bench_filter(c: &mut Criterion) {
    let filter = PathFilter::parse(&["es6//feature 1.*"], &["es6/category 3"]).unwrap();
    let path = ["es6", "category 1", "feature 17", "case 3 of feature 17"];
    c.bench_function("filter_check", |b| b.iter(|| filter.accept(black_box(&path))));
}

criterion_group!(benches, bench_generate, bench_generate_minified, bench_filter);
criterion_main!(benches);
