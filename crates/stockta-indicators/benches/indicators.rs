//! Benchmarks for indicator implementations.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stockta_core::traits::Indicator;
use stockta_core::types::{Bar, BarSeries, Ticker};
use stockta_indicators::{compute, Ema, Rsi, Sma};

fn generate_test_data(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 10.0)
        .collect()
}

fn generate_series(size: usize) -> BarSeries {
    let bars = generate_test_data(size)
        .into_iter()
        .enumerate()
        .map(|(i, close)| {
            Bar::new(
                i as i64 * 86_400_000,
                close - 0.5,
                close + 1.0,
                close - 1.0,
                close,
                1_000_000.0 + (i % 7) as f64 * 10_000.0,
            )
        })
        .collect();
    BarSeries::new(Ticker::parse("BENCH").expect("valid ticker"), bars)
}

fn benchmark_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("Single");

    for size in [250, 1250, 10000].iter() {
        let data = generate_test_data(*size);

        group.bench_with_input(BenchmarkId::new("sma_20", size), &data, |b, data| {
            let sma = Sma::new(20);
            b.iter(|| sma.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("ema_26", size), &data, |b, data| {
            let ema = Ema::new(26);
            b.iter(|| ema.calculate(black_box(data)))
        });

        group.bench_with_input(BenchmarkId::new("rsi_14", size), &data, |b, data| {
            let rsi = Rsi::new(14);
            b.iter(|| rsi.calculate(black_box(data)))
        });
    }

    group.finish();
}

fn benchmark_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("Frame");

    // One trading year up to a long history
    for size in [250, 1250, 10000].iter() {
        let series = generate_series(*size);

        group.bench_with_input(BenchmarkId::new("compute", size), &series, |b, series| {
            b.iter(|| compute(black_box(series)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_single, benchmark_compute);
criterion_main!(benches);
