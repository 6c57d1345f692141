//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over price sources (Yahoo Finance, CSV
//! import, synthetic walk) so the pipeline can swap implementations and tests
//! can substitute fakes.

use crate::domain::{SeriesError, TimeSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error types for data operations.
///
/// `NoData` is the fatal "fetch returned nothing" case; the pipeline aborts on
/// it before any forecast or render step runs.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("no data returned for {symbol}; try again later")]
    NoData { symbol: String },

    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),
}

/// Result of a successful data fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub series: TimeSeries,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Trait for daily adjusted-close price sources.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the adjusted daily close series for `symbol` over `[start, end]`.
    ///
    /// The returned series carries `label`. Implementations must return
    /// `DataError::NoData` rather than an empty series.
    fn fetch(
        &self,
        symbol: &str,
        label: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError>;
}

/// Reject inverted ranges before any request is made.
pub fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), DataError> {
    if start > end {
        return Err(DataError::InvalidRange { start, end });
    }
    Ok(())
}

/// Turn an empty series into `DataError::NoData`.
pub fn require_data(symbol: &str, series: TimeSeries) -> Result<TimeSeries, DataError> {
    if series.is_empty() {
        return Err(DataError::NoData {
            symbol: symbol.to_string(),
        });
    }
    Ok(series)
}
