//! Polynomial trend forecaster.
//!
//! Fits a least-squares polynomial (degree 2 by default) of price against
//! proleptic day ordinal and extrapolates it over a horizon of consecutive
//! calendar days following the last observation. Pure computation: no I/O.

pub mod polyfit;

pub use polyfit::PolynomialModel;

use crate::domain::{PricePoint, TimeSeries};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default polynomial degree for the trend.
pub const DEFAULT_DEGREE: usize = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("insufficient data: fit needs at least {required} distinct dates, got {distinct}")]
    InsufficientData { required: usize, distinct: usize },

    #[error("least-squares system is singular")]
    SingularFit,

    #[error("x and y lengths differ ({xs} vs {ys})")]
    LengthMismatch { xs: usize, ys: usize },

    #[error("input contains NaN or infinite values")]
    NonFinite,

    #[error("forecast date overflows the calendar after {last}")]
    DateOverflow { last: NaiveDate },
}

/// Proleptic Gregorian ordinal: 0001-01-01 is day 1.
pub fn date_to_ordinal(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

/// Inverse of [`date_to_ordinal`]. `None` outside chrono's date range.
pub fn ordinal_to_date(ordinal: i64) -> Option<NaiveDate> {
    i32::try_from(ordinal)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// Extrapolated trend for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub label: String,
    pub model: PolynomialModel,
    /// One point per future day, starting the day after the last observation.
    pub points: Vec<PricePoint>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// Fits and extrapolates polynomial trends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Forecaster {
    degree: usize,
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new(DEFAULT_DEGREE)
    }
}

impl Forecaster {
    pub fn new(degree: usize) -> Self {
        Self { degree }
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Fit the trend model to a series without extrapolating.
    pub fn fit(&self, series: &TimeSeries) -> Result<PolynomialModel, ForecastError> {
        let xs: Vec<f64> = series
            .dates()
            .map(|d| date_to_ordinal(d) as f64)
            .collect();
        let ys: Vec<f64> = series.prices().collect();
        let model = PolynomialModel::fit(&xs, &ys, self.degree)?;
        tracing::debug!(
            label = series.label(),
            observations = series.len(),
            coefficients = ?model.coefficients(),
            "fitted trend"
        );
        Ok(model)
    }

    /// Fit the series and evaluate the trend on the `horizon_days` calendar
    /// days following its last date. A zero horizon yields an empty forecast.
    pub fn forecast(
        &self,
        series: &TimeSeries,
        horizon_days: u32,
    ) -> Result<Forecast, ForecastError> {
        let model = self.fit(series)?;
        // fit() guarantees at least degree + 1 points.
        let last = series.last_date().ok_or(ForecastError::InsufficientData {
            required: self.degree + 1,
            distinct: 0,
        })?;

        // The whole horizon must fit in the calendar before anything is allocated.
        last.checked_add_days(Days::new(u64::from(horizon_days)))
            .ok_or(ForecastError::DateOverflow { last })?;

        let points = (1..=u64::from(horizon_days))
            .map(|step| {
                let date = last
                    .checked_add_days(Days::new(step))
                    .ok_or(ForecastError::DateOverflow { last })?;
                Ok(PricePoint::new(date, model.evaluate(date_to_ordinal(date) as f64)))
            })
            .collect::<Result<Vec<_>, ForecastError>>()?;

        Ok(Forecast {
            label: series.label().to_string(),
            model,
            points,
        })
    }
}
