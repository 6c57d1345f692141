//! Integration tests for the forecast pipeline.
//!
//! A scripted in-memory provider and a recording renderer stand in for Yahoo
//! and gnuplot, so these tests exercise ordering, fail-fast behaviour, and
//! output replacement without network access or external binaries.

use chrono::{Days, NaiveDate};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use trendcast_core::data::{DataError, DataProvider, DataSource, FetchResult};
use trendcast_core::{PricePoint, TimeSeries};
use trendcast_runner::{
    run_forecast, Chart, ChartRenderer, ConfigError, ForecastConfig, RenderError, RunError,
};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ── Fakes ────────────────────────────────────────────────────────────

/// Serves fixed point lists per symbol and records fetch order.
#[derive(Default)]
struct ScriptedProvider {
    data: HashMap<String, Vec<PricePoint>>,
    calls: std::sync::Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn with(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl DataProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(
        &self,
        symbol: &str,
        label: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        let points = self.data.get(symbol).cloned().unwrap_or_default();
        let series = TimeSeries::new(label, points)?.clip(start, end);
        if series.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            series,
            source: DataSource::CsvImport,
        })
    }
}

/// Writes a placeholder file and keeps the charts it was given.
#[derive(Default)]
struct RecordingRenderer {
    charts: RefCell<Vec<(Chart, PathBuf)>>,
}

impl ChartRenderer for RecordingRenderer {
    fn extension(&self) -> &str {
        "png"
    }

    fn render(&self, chart: &Chart, path: &Path) -> Result<(), RenderError> {
        std::fs::write(path, b"\x89PNG")?;
        self.charts
            .borrow_mut()
            .push((chart.clone(), path.to_path_buf()));
        Ok(())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn daily(start: &str, n: u64, f: impl Fn(f64) -> f64) -> Vec<PricePoint> {
    let start = d(start);
    (0..n)
        .map(|i| PricePoint::new(start + Days::new(i), f(i as f64)))
        .collect()
}

fn config_in(dir: &Path) -> ForecastConfig {
    let mut config = ForecastConfig::default();
    config.start_date = d("2024-01-01");
    config.end_date = Some(d("2024-03-31"));
    config.horizon_days = 60;
    config.output.dir = dir.to_path_buf();
    config
}

fn provider() -> ScriptedProvider {
    ScriptedProvider::default()
        .with("GC=F", daily("2024-01-01", 91, |x| 2000.0 + 1.5 * x))
        .with("BTC-USD", daily("2024-01-01", 91, |x| 40000.0 + 3.0 * x * x))
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn happy_path_writes_one_stamped_chart() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = provider();
    let renderer = RecordingRenderer::default();

    let report = run_forecast(&config_in(tmp.path()), &provider, &renderer, d("2024-04-02")).unwrap();

    assert_eq!(provider.calls(), vec!["GC=F", "BTC-USD"]);
    assert_eq!(report.observations, 91);
    assert_eq!(report.horizon_days, 60);
    assert_eq!(files_in(tmp.path()), vec!["btc_gold_forecast_2024-04-02.png"]);

    let charts = renderer.charts.borrow();
    assert_eq!(charts.len(), 1);
    let chart = &charts[0].0;
    assert_eq!(chart.series.len(), 4);
    assert_eq!(chart.series[2].points.len(), 60);
    assert_eq!(chart.series[2].points[0].date, d("2024-04-01"));

    // Bitcoin follows an exact parabola, so the forecast continues it.
    let btc = &report.assets[1];
    let last = btc.last_forecast.unwrap();
    let x = 90.0 + 60.0;
    assert!((last.price - (40000.0 + 3.0 * x * x)).abs() < 1e-2);
}

#[test]
fn empty_first_fetch_aborts_before_anything_else() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::default()
        .with("BTC-USD", daily("2024-01-01", 91, |x| 40000.0 + x));
    let renderer = RecordingRenderer::default();

    let err = run_forecast(&config_in(tmp.path()), &provider, &renderer, d("2024-04-02")).unwrap_err();

    assert!(matches!(
        err,
        RunError::Data { source: DataError::NoData { .. }, .. }
    ));
    assert_eq!(provider.calls(), vec!["GC=F"], "second asset must not be fetched");
    assert!(renderer.charts.borrow().is_empty());
    assert!(files_in(tmp.path()).is_empty());
}

#[test]
fn empty_second_fetch_leaves_previous_chart_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("btc_gold_forecast_2024-03-01.png"), b"old").unwrap();
    let provider = ScriptedProvider::default()
        .with("GC=F", daily("2024-01-01", 91, |x| 2000.0 + x));
    let renderer = RecordingRenderer::default();

    let err = run_forecast(&config_in(tmp.path()), &provider, &renderer, d("2024-04-02")).unwrap_err();

    assert!(err.to_string().contains("Bitcoin"));
    assert!(renderer.charts.borrow().is_empty());
    assert_eq!(files_in(tmp.path()), vec!["btc_gold_forecast_2024-03-01.png"]);
}

#[test]
fn rerun_leaves_exactly_one_current_file() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = provider();
    let renderer = RecordingRenderer::default();
    let config = config_in(tmp.path());

    run_forecast(&config, &provider, &renderer, d("2024-04-02")).unwrap();
    let report = run_forecast(&config, &provider, &renderer, d("2024-04-03")).unwrap();

    assert_eq!(files_in(tmp.path()), vec!["btc_gold_forecast_2024-04-03.png"]);
    assert_eq!(
        report.output.deleted,
        vec![tmp.path().join("btc_gold_forecast_2024-04-02.png")]
    );
}

#[test]
fn disjoint_histories_are_no_overlap() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::default()
        .with("GC=F", daily("2024-01-01", 10, |x| 2000.0 + x))
        .with("BTC-USD", daily("2024-02-01", 10, |x| 40000.0 + x));
    let renderer = RecordingRenderer::default();

    let err = run_forecast(&config_in(tmp.path()), &provider, &renderer, d("2024-04-02")).unwrap_err();
    assert!(matches!(err, RunError::NoOverlap { .. }));
}

#[test]
fn too_little_overlap_is_insufficient_data() {
    let tmp = tempfile::tempdir().unwrap();
    let provider = ScriptedProvider::default()
        .with("GC=F", daily("2024-01-01", 10, |x| 2000.0 + x))
        .with("BTC-USD", daily("2024-01-09", 10, |x| 40000.0 + x));
    let renderer = RecordingRenderer::default();

    let err = run_forecast(&config_in(tmp.path()), &provider, &renderer, d("2024-04-02")).unwrap_err();
    assert!(matches!(
        err,
        RunError::Forecast {
            source: trendcast_core::ForecastError::InsufficientData { required: 3, distinct: 2 },
            ..
        }
    ));
    assert!(renderer.charts.borrow().is_empty());
}

#[test]
fn zero_horizon_renders_actuals_only() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = config_in(tmp.path());
    config.horizon_days = 0;
    let renderer = RecordingRenderer::default();

    let report = run_forecast(&config, &provider(), &renderer, d("2024-04-02")).unwrap();

    assert!(report.assets.iter().all(|a| a.last_forecast.is_none()));
    let charts = renderer.charts.borrow();
    assert!(charts[0].0.series[2].points.is_empty());
    assert_eq!(charts[0].0.series[0].points.len(), 91);
}

#[test]
fn open_end_date_stops_before_run_date() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = config_in(tmp.path());
    config.end_date = None;
    let renderer = RecordingRenderer::default();

    let report = run_forecast(&config, &provider(), &renderer, d("2024-02-15")).unwrap();
    assert_eq!(report.end_date, d("2024-02-14"));
    assert_eq!(report.observations, 45);
    assert_eq!(
        report.assets[0].last_actual.map(|p| p.date),
        Some(d("2024-02-14"))
    );
}

#[test]
fn invalid_range_is_config_error() {
    let tmp = tempfile::tempdir().unwrap();
    let mut config = config_in(tmp.path());
    config.end_date = Some(d("2023-01-01"));
    let provider = provider();

    let err = run_forecast(&config, &provider, &RecordingRenderer::default(), d("2024-04-02"))
        .unwrap_err();
    assert!(matches!(err, RunError::Config(ConfigError::InvalidRange { .. })));
    assert!(provider.calls().is_empty());
}

#[test]
fn report_serializes_to_json() {
    let tmp = tempfile::tempdir().unwrap();
    let report = run_forecast(
        &config_in(tmp.path()),
        &provider(),
        &RecordingRenderer::default(),
        d("2024-04-02"),
    )
    .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["observations"], 91);
    assert_eq!(json["assets"][0]["label"], "Gold");
    assert_eq!(json["assets"][0]["source"], "csv_import");
    assert_eq!(json["end_date"], "2024-03-31");
}
