//! Criterion benchmarks for the forecaster.
//!
//! Benchmarks:
//! 1. Quadratic fit over a decade of daily observations
//! 2. Fit plus five-year extrapolation
//! 3. Inner-join alignment of two decade-long series

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trendcast_core::data::align_inner;
use trendcast_core::{Forecaster, PricePoint, TimeSeries};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_series(label: &str, n: u64, every: u64) -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
    let points = (0..n)
        .filter(|i| i % every == 0)
        .map(|i| {
            let x = i as f64;
            PricePoint::new(start + Days::new(i), 1000.0 + x + (x * 0.05).sin() * 50.0)
        })
        .collect();
    TimeSeries::new(label, points).unwrap()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    for n in [365u64, 3650] {
        let series = make_series("x", n, 1);
        group.bench_with_input(BenchmarkId::from_parameter(n), &series, |b, s| {
            b.iter(|| Forecaster::default().fit(black_box(s)).unwrap())
        });
    }
    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let series = make_series("x", 3650, 1);
    c.bench_function("forecast_3650_obs_1825_days", |b| {
        b.iter(|| {
            Forecaster::default()
                .forecast(black_box(&series), black_box(1825))
                .unwrap()
        })
    });
}

fn bench_align(c: &mut Criterion) {
    let a = make_series("a", 3650, 1);
    let b = make_series("b", 3650, 2);
    c.bench_function("align_inner_3650", |bench| {
        bench.iter(|| align_inner(black_box(&a), black_box(&b)))
    });
}

criterion_group!(benches, bench_fit, bench_forecast, bench_align);
criterion_main!(benches);
