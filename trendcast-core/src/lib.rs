//! Trendcast Core: price series, data providers, alignment, trend forecasting.
//!
//! This crate contains the computational side of the forecast pipeline:
//! - Validated daily price series
//! - Data providers (Yahoo Finance, CSV import, synthetic walk)
//! - Inner-join alignment of two series on date
//! - Least-squares polynomial trend fit and extrapolation

pub mod data;
pub mod domain;
pub mod forecast;

pub use domain::{PricePoint, SeriesError, TimeSeries};
pub use forecast::{Forecast, ForecastError, Forecaster, PolynomialModel};
