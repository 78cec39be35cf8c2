// ============================================================================
// Operator Engine Benchmarks
// ============================================================================
//
// Benchmark Categories:
// 1. Resolution - Cached vs uncached result-type derivation
// 2. Evaluation - Native-width, wide and fixed-point arithmetic
// 3. Conversion - Rescaling across exponents and radices
// 4. Literals - Text and decimal ingestion
// ============================================================================

use compositional_numeric::prelude::*;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rust_decimal::Decimal;
use std::hint::black_box;
use std::sync::Arc;

fn engine(cached: bool) -> OperatorEngine {
    let builder = OperatorEngineBuilder::new();
    let builder = if cached { builder } else { builder.without_cache() };
    builder.build(Arc::new(NoOpEventHandler)).unwrap()
}

// ============================================================================
// Resolution Benchmarks
// ============================================================================

fn benchmark_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    let lhs = static_number(24, -12).unwrap();
    let rhs = static_number(16, -4).unwrap();

    for cached in [true, false] {
        let engine = engine(cached);
        group.bench_with_input(
            BenchmarkId::from_parameter(if cached { "cached" } else { "uncached" }),
            &engine,
            |b, engine| {
                b.iter(|| black_box(engine.resolve(OperatorKind::Multiply, &lhs, &rhs).unwrap()));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Evaluation Benchmarks
// ============================================================================

fn benchmark_elastic_addition(c: &mut Criterion) {
    let mut group = c.benchmark_group("elastic_addition");
    let engine = engine(true);

    // Native-width operands and operands backed by wide limbs
    for digits in [15u32, 62, 200] {
        let ty = elastic_integer(digits, true).unwrap();
        let x = Number::max(&ty);
        let y = Number::lowest(&ty);

        group.bench_with_input(BenchmarkId::from_parameter(digits), &(x, y), |b, (x, y)| {
            b.iter(|| black_box(engine.apply(OperatorKind::Add, x, y).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_fixed_point(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_point");
    let engine = engine(true);

    let q16 = NumberTypeBuilder::new()
        .rep(RepType::I32)
        .scaled(-16)
        .rounding(RoundingPolicy::Nearest)
        .overflow(OverflowPolicy::Saturating)
        .build()
        .unwrap();
    let x = engine.convert(&parse("3.14159").unwrap(), &q16).unwrap();
    let y = engine.convert(&parse("2.71828").unwrap(), &q16).unwrap();

    group.bench_function("multiply", |b| {
        b.iter(|| black_box(engine.apply(OperatorKind::Multiply, &x, &y).unwrap()));
    });

    group.bench_function("lean_divide", |b| {
        b.iter(|| black_box(engine.apply(OperatorKind::Divide, &x, &y).unwrap()));
    });

    group.bench_function("quotient", |b| {
        b.iter(|| black_box(engine.quotient(&x, &y).unwrap()));
    });

    group.bench_function("saturating_add", |b| {
        let big = Number::max(&q16);
        b.iter(|| black_box(engine.apply(OperatorKind::Add, &big, &x).unwrap()));
    });

    group.finish();
}

// ============================================================================
// Conversion Benchmarks
// ============================================================================

fn benchmark_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("conversion");
    let engine = engine(true);

    let binary = scaled_integer(RepType::I64, -20).unwrap();
    let decimal = NumberTypeBuilder::new()
        .rep(RepType::I64)
        .scaled_radix(-6, 10)
        .build()
        .unwrap();
    let value = engine.convert(&parse("1234.5678").unwrap(), &binary).unwrap();

    group.bench_function("same_radix", |b| {
        let narrower = scaled_integer(RepType::I32, -8).unwrap();
        b.iter(|| black_box(engine.convert(&value, &narrower).unwrap()));
    });

    group.bench_function("cross_radix", |b| {
        b.iter(|| black_box(engine.convert(&value, &decimal).unwrap()));
    });

    group.finish();
}

// ============================================================================
// Literal Benchmarks
// ============================================================================

fn benchmark_literals(c: &mut Criterion) {
    let mut group = c.benchmark_group("literals");

    group.bench_function("parse_hex", |b| {
        b.iter(|| black_box(parse(black_box("0xDEAD_BEEF_CAFE")).unwrap()));
    });

    group.bench_function("parse_fraction", |b| {
        b.iter(|| black_box(parse(black_box("-98765.4321")).unwrap()));
    });

    group.bench_function("from_decimal", |b| {
        let value = Decimal::new(1_234_567, 4);
        b.iter(|| black_box(from_decimal(black_box(value)).unwrap()));
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_resolution,
    benchmark_elastic_addition,
    benchmark_fixed_point,
    benchmark_conversion,
    benchmark_literals,
);
criterion_main!(benches);
