//! Benchmarks for payframe form helpers.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use payframe::{
    expiry, format, identify_brand, identify_digits,
    rules::{BinMatcher, BinTable},
    CardBrand, CardNumber,
};

// Test card numbers
const ZINLI: &str = "4022760000000001";
const VISA_16: &str = "4111111111111111";
const VISA_16_FORMATTED: &str = "4111-1111-1111-1111";
const MASTERCARD_2: &str = "2223000048400011";
const AMEX: &str = "378282246310005";

const ZINLI_DIGITS: [u8; 16] = [4, 0, 2, 2, 7, 6, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];

/// Benchmark brand identification against the standard table
fn bench_identify(c: &mut Criterion) {
    let mut group = c.benchmark_group("identify_brand");

    for (name, card) in [
        ("zinli", ZINLI),
        ("visa", VISA_16),
        ("visa_formatted", VISA_16_FORMATTED),
        ("mastercard_2_series", MASTERCARD_2),
        ("unknown", AMEX),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), card, |b, card| {
            b.iter(|| identify_brand(black_box(card)))
        });
    }

    group.bench_function("digits", |b| {
        b.iter(|| identify_digits(black_box(&ZINLI_DIGITS)))
    });

    group.finish();
}

/// Benchmark identification while the user types, one keystroke at a time
fn bench_typing(c: &mut Criterion) {
    let prefixes: Vec<&str> = (1..=ZINLI.len()).map(|i| &ZINLI[..i]).collect();

    let mut group = c.benchmark_group("typing");
    group.throughput(Throughput::Elements(prefixes.len() as u64));

    group.bench_function("identify_and_format", |b| {
        b.iter(|| {
            for prefix in &prefixes {
                black_box(identify_brand(prefix));
                black_box(format::format_for_display(prefix));
            }
        })
    });

    group.finish();
}

/// Benchmark a larger partner table
fn bench_custom_table(c: &mut Criterion) {
    let mut builder = BinTable::builder();
    for i in 0..200u32 {
        let bin = format!("{}", 400_000 + i * 37);
        if let Ok(matcher) = BinMatcher::prefixes([bin]) {
            builder = builder.rule(CardBrand::Zinli, 0, matcher);
        }
    }
    let table = builder
        .rule(CardBrand::Visa, 20, BinMatcher::prefixes(["4"]).unwrap())
        .build()
        .unwrap();

    c.bench_function("custom_table_200_rules", |b| {
        b.iter(|| table.identify(black_box(VISA_16)))
    });
}

/// Benchmark formatting
fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");

    group.bench_function("display", |b| {
        b.iter(|| format::format_for_display(black_box(VISA_16)))
    });

    group.bench_function("clean", |b| {
        b.iter(|| format::clean_for_transmission(black_box(VISA_16_FORMATTED)))
    });

    group.bench_function("card_face", |b| {
        b.iter(|| format::card_face_number(black_box(VISA_16)))
    });

    group.finish();
}

/// Benchmark expiry conversion
fn bench_expiry(c: &mut Criterion) {
    let mut group = c.benchmark_group("expiry");

    group.bench_function("to_wire_format", |b| {
        b.iter(|| expiry::to_wire_format(black_box("202710")))
    });

    group.bench_function("to_short_year", |b| {
        b.iter(|| expiry::to_short_year(black_box("202710")))
    });

    group.bench_function("from_canonical", |b| {
        b.iter(|| expiry::ExpiryDate::from_canonical(black_box("2027/10")))
    });

    group.finish();
}

/// Benchmark full card parsing
fn bench_card_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("card_parse");

    group.bench_function("raw", |b| {
        b.iter(|| CardNumber::parse(black_box(ZINLI)))
    });

    group.bench_function("formatted", |b| {
        b.iter(|| CardNumber::parse(black_box(VISA_16_FORMATTED)))
    });

    group.bench_function("parse_and_mask", |b| {
        b.iter(|| CardNumber::parse(black_box(VISA_16)).map(|card| card.masked()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_identify,
    bench_typing,
    bench_custom_table,
    bench_format,
    bench_expiry,
    bench_card_parse,
);

criterion_main!(benches);
