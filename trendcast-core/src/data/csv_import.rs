//! CSV import provider.
//!
//! Reads `<dir>/<file stem>.csv` with a header row and at least the columns
//! `date` (YYYY-MM-DD) and `adj_close`. The file stem is the symbol with
//! characters that are awkward in file names (`=`, `/`, `^`) replaced by `_`,
//! so `GC=F` maps to `GC_F.csv`.

use super::provider::{
    check_range, require_data, DataError, DataProvider, DataSource, FetchResult,
};
use crate::domain::{PricePoint, TimeSeries};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    adj_close: Option<f64>,
}

/// Offline provider backed by a directory of CSV files.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the CSV file for a symbol.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", file_stem(symbol)))
    }

    fn read_series(path: &Path, label: &str) -> Result<TimeSeries, DataError> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut points = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row?;
            if let Some(price) = row.adj_close {
                points.push(PricePoint::new(row.date, price));
            }
        }
        Ok(TimeSeries::from_unsorted(label, points)?)
    }
}

fn file_stem(symbol: &str) -> String {
    symbol
        .chars()
        .map(|c| match c {
            '=' | '/' | '^' | '\\' => '_',
            other => other,
        })
        .collect()
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        symbol: &str,
        label: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        check_range(start, end)?;
        let path = self.path_for(symbol);
        if !path.exists() {
            tracing::warn!(symbol, path = %path.display(), "CSV file missing");
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let series = Self::read_series(&path, label)?.clip(start, end);
        let series = require_data(symbol, series)?;
        tracing::info!(symbol, rows = series.len(), path = %path.display(), "loaded CSV series");

        Ok(FetchResult {
            symbol: symbol.to_string(),
            series,
            source: DataSource::CsvImport,
        })
    }
}
