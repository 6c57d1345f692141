//! Forecast runner: wires together providers, aligner, forecaster, and renderer.
//!
//! One linear pass per invocation:
//! fetch first → fetch second → align → forecast both → render → replace output.
//! Any fetch failure (including an empty result) aborts before the forecaster
//! or renderer is touched, so a failed run never leaves a partial chart.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use trendcast_core::data::{align_inner, AlignedPair, DataError, DataProvider, DataSource};
use trendcast_core::{Forecast, ForecastError, Forecaster, PricePoint};

use crate::config::{AssetConfig, ConfigError, ForecastConfig};
use crate::output::{replace_current_output, OutputReport, OutputTarget};
use crate::render::{Chart, ChartRenderer, ChartSeries, ChartStyle, LineKind, RenderError};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("fetching {label}: {source}")]
    Data {
        label: String,
        #[source]
        source: DataError,
    },
    #[error("no dates shared by {first} and {second} in the requested range")]
    NoOverlap { first: String, second: String },
    #[error("forecasting {label}: {source}")]
    Forecast {
        label: String,
        #[source]
        source: ForecastError,
    },
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Line colours: (actual, forecast) per asset slot.
const FIRST_COLORS: (&str, &str) = ("#FFD700", "#B8860B");
const SECOND_COLORS: (&str, &str) = ("#FFA500", "#8B0000");

/// Per-asset outcome of a run.
#[derive(Debug, Clone, Serialize)]
pub struct AssetSummary {
    pub label: String,
    pub symbol: String,
    pub source: DataSource,
    /// Rows returned by the provider, before alignment.
    pub fetched_rows: usize,
    /// Trend coefficients in ordinal-day units, highest power first.
    pub coefficients: Vec<f64>,
    pub last_actual: Option<PricePoint>,
    pub last_forecast: Option<PricePoint>,
}

/// Summary of a completed run.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Rows remaining after the inner join.
    pub observations: usize,
    pub horizon_days: u32,
    pub assets: Vec<AssetSummary>,
    pub output: OutputReport,
}

/// Run the whole pipeline once.
///
/// `today` resolves an open-ended history window and stamps the output name.
pub fn run_forecast(
    config: &ForecastConfig,
    provider: &dyn DataProvider,
    renderer: &dyn ChartRenderer,
    today: NaiveDate,
) -> Result<RunReport, RunError> {
    config.validate(today)?;
    let start = config.start_date;
    let end = config.resolved_end(today);
    tracing::info!(provider = provider.name(), %start, %end, "starting forecast run");

    let first = fetch(provider, &config.first, start, end)?;
    let second = fetch(provider, &config.second, start, end)?;

    let aligned = align_inner(&first.series, &second.series);
    if aligned.is_empty() {
        return Err(RunError::NoOverlap {
            first: config.first.label.clone(),
            second: config.second.label.clone(),
        });
    }

    let forecaster = Forecaster::new(config.degree);
    let first_fc = forecast(&forecaster, &aligned.first, config.horizon_days)?;
    let second_fc = forecast(&forecaster, &aligned.second, config.horizon_days)?;

    let chart = build_chart(config, &aligned, &first_fc, &second_fc);
    let target = output_target(config, renderer.extension(), today);
    let output = replace_current_output(&target, |path| {
        renderer.render(&chart, path).map_err(RunError::from)
    })?;

    let assets = vec![
        summarize(&config.first, &first, &aligned.first, &first_fc),
        summarize(&config.second, &second, &aligned.second, &second_fc),
    ];
    tracing::info!(path = %output.written.display(), "forecast run complete");

    Ok(RunReport {
        start_date: start,
        end_date: end,
        observations: aligned.len(),
        horizon_days: config.horizon_days,
        assets,
        output,
    })
}

fn fetch(
    provider: &dyn DataProvider,
    asset: &AssetConfig,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<trendcast_core::data::FetchResult, RunError> {
    provider
        .fetch(&asset.symbol, &asset.label, start, end)
        .map_err(|source| RunError::Data {
            label: asset.label.clone(),
            source,
        })
}

fn forecast(
    forecaster: &Forecaster,
    series: &trendcast_core::TimeSeries,
    horizon: u32,
) -> Result<Forecast, RunError> {
    forecaster
        .forecast(series, horizon)
        .map_err(|source| RunError::Forecast {
            label: series.label().to_string(),
            source,
        })
}

fn summarize(
    asset: &AssetConfig,
    fetched: &trendcast_core::data::FetchResult,
    aligned: &trendcast_core::TimeSeries,
    forecast: &Forecast,
) -> AssetSummary {
    AssetSummary {
        label: asset.label.clone(),
        symbol: asset.symbol.clone(),
        source: fetched.source,
        fetched_rows: fetched.series.len(),
        coefficients: forecast.model.coefficients(),
        last_actual: aligned.points().last().copied(),
        last_forecast: forecast.last().copied(),
    }
}

/// Where this run's chart goes.
pub fn output_target(config: &ForecastConfig, extension: &str, today: NaiveDate) -> OutputTarget {
    let out = &config.output;
    if out.date_stamped {
        OutputTarget::stamped(&out.dir, &out.stem, extension, today)
    } else {
        OutputTarget::fixed(&out.dir, &out.stem, extension)
    }
}

/// Assemble the four lines (two actual, two forecast) and the title.
pub fn build_chart(
    config: &ForecastConfig,
    aligned: &AlignedPair,
    first: &Forecast,
    second: &Forecast,
) -> Chart {
    let start_year = aligned
        .dates
        .first()
        .map(|d| d.year())
        .unwrap_or_else(|| config.start_date.year());
    let end_year = first
        .last()
        .map(|p| p.date)
        .or_else(|| aligned.dates.last().copied())
        .map(|d| d.year())
        .unwrap_or(start_year);

    let line = |caption: String, color: &str, kind: LineKind, points: &[PricePoint]| ChartSeries {
        caption,
        color: color.to_string(),
        kind,
        points: points.to_vec(),
    };

    let first_label = &config.first.label;
    let second_label = &config.second.label;
    Chart {
        title: format!(
            "Price Forecast of {first_label} and {second_label} ({start_year}–{end_year})"
        ),
        series: vec![
            line(
                format!("{first_label} (actual)"),
                FIRST_COLORS.0,
                LineKind::Solid,
                aligned.first.points(),
            ),
            line(
                format!("{second_label} (actual)"),
                SECOND_COLORS.0,
                LineKind::Solid,
                aligned.second.points(),
            ),
            line(
                format!("{first_label} (forecast)"),
                FIRST_COLORS.1,
                LineKind::Dashed,
                &first.points,
            ),
            line(
                format!("{second_label} (forecast)"),
                SECOND_COLORS.1,
                LineKind::Dashed,
                &second.points,
            ),
        ],
        style: ChartStyle::default(),
    }
}
