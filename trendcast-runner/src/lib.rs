//! Trendcast Runner: configuration, pipeline orchestration, chart output.
//!
//! This crate builds on `trendcast-core` to provide:
//! - TOML configuration with documented defaults
//! - The fetch → align → forecast → render pipeline
//! - A gnuplot chart renderer behind a swappable trait
//! - Best-effort replacement of previously written charts

pub mod config;
pub mod output;
pub mod render;
pub mod runner;

pub use config::{AssetConfig, ConfigError, ForecastConfig, OutputConfig, DEFAULT_HORIZON_DAYS};
pub use output::{replace_current_output, FileDeletionError, OutputReport, OutputTarget};
pub use render::{Chart, ChartRenderer, ChartSeries, ChartStyle, GnuplotRenderer, LineKind, RenderError};
pub use runner::{build_chart, run_forecast, AssetSummary, RunError, RunReport};
