//! Daily price series.
//!
//! A `TimeSeries` is an ordered run of (date, price) observations for one
//! instrument. Dates are strictly increasing and prices are finite and
//! non-negative; every constructor enforces this, so downstream code
//! (aligner, forecaster, renderer) never re-checks it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("dates must be strictly increasing: {prev} is followed by {next}")]
    NotIncreasing { prev: NaiveDate, next: NaiveDate },

    #[error("price on {date} must be finite and non-negative, got {price}")]
    InvalidPrice { date: NaiveDate, price: f64 },
}

/// A labelled, validated daily price series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    label: String,
    points: Vec<PricePoint>,
}

impl TimeSeries {
    /// Build a series from points that are already in chronological order.
    pub fn new(label: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        validate(&points)?;
        Ok(Self {
            label: label.into(),
            points,
        })
    }

    /// Build a series from provider output that may be unsorted or contain
    /// repeated dates. Later duplicates replace earlier ones.
    pub fn from_unsorted(
        label: impl Into<String>,
        mut points: Vec<PricePoint>,
    ) -> Result<Self, SeriesError> {
        // Stable sort keeps arrival order within a date, so the last one wins below.
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }
        Self::new(label, deduped)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.price)
    }

    /// Same label, new points drawn from this series in order.
    pub(crate) fn subsequence(&self, points: Vec<PricePoint>) -> Self {
        debug_assert!(validate(&points).is_ok());
        Self {
            label: self.label.clone(),
            points,
        }
    }

    /// Keep only observations with `start <= date <= end`.
    pub fn clip(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            label: self.label.clone(),
            points: self
                .points
                .iter()
                .filter(|p| p.date >= start && p.date <= end)
                .copied()
                .collect(),
        }
    }
}

fn validate(points: &[PricePoint]) -> Result<(), SeriesError> {
    for point in points {
        if !point.price.is_finite() || point.price < 0.0 {
            return Err(SeriesError::InvalidPrice {
                date: point.date,
                price: point.price,
            });
        }
    }
    for pair in points.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(SeriesError::NotIncreasing {
                prev: pair[0].date,
                next: pair[1].date,
            });
        }
    }
    Ok(())
}
