//! Domain types for trendcast

pub mod series;

pub use series::{PricePoint, SeriesError, TimeSeries};
