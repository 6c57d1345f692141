//! Synthetic price provider for offline runs and demos.
//!
//! Produces a deterministic geometric random walk per symbol. The RNG seed is
//! the BLAKE3 hash of the symbol, so the same symbol always yields the same
//! path. Crypto pairs (`*-USD`) trade every calendar day; everything else
//! skips weekends, which gives the aligner real gaps to join over.

use super::provider::{
    check_range, require_data, DataError, DataProvider, DataSource, FetchResult,
};
use crate::domain::{PricePoint, TimeSeries};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic random-walk provider.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    start_price: f64,
    daily_drift: f64,
    daily_vol: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            start_price: 100.0,
            daily_drift: 0.0005,
            daily_vol: 0.02,
        }
    }
}

impl SyntheticProvider {
    pub fn new(start_price: f64, daily_drift: f64, daily_vol: f64) -> Self {
        Self {
            start_price,
            daily_drift,
            daily_vol,
        }
    }

    fn trades_on(symbol: &str, date: NaiveDate) -> bool {
        symbol.ends_with("-USD") || !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    fn generate(&self, symbol: &str, label: &str, start: NaiveDate, end: NaiveDate) -> Result<TimeSeries, DataError> {
        let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut points = Vec::new();
        let mut price = self.start_price;
        let mut current = start;
        while current <= end {
            if Self::trades_on(symbol, current) {
                points.push(PricePoint::new(current, price));
                let shock: f64 = rng.gen_range(-1.0..1.0) * self.daily_vol;
                price *= (self.daily_drift + shock).exp();
            }
            match current.checked_add_days(Days::new(1)) {
                Some(next) => current = next,
                None => break,
            }
        }
        Ok(TimeSeries::new(label, points)?)
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        label: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        check_range(start, end)?;
        tracing::warn!(symbol, "generating synthetic data; results are not market prices");
        let series = require_data(symbol, self.generate(symbol, label, start, end)?)?;
        Ok(FetchResult {
            symbol: symbol.to_string(),
            series,
            source: DataSource::Synthetic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn deterministic_per_symbol() {
        let provider = SyntheticProvider::default();
        let a = provider.fetch("GC=F", "Gold", d("2024-01-01"), d("2024-03-01")).unwrap();
        let b = provider.fetch("GC=F", "Gold", d("2024-01-01"), d("2024-03-01")).unwrap();
        assert_eq!(a.series, b.series);
        assert_eq!(a.source, DataSource::Synthetic);
    }

    #[test]
    fn crypto_trades_weekends_others_do_not() {
        let provider = SyntheticProvider::default();
        // 2024-01-01 is a Monday; two full weeks.
        let gold = provider.fetch("GC=F", "Gold", d("2024-01-01"), d("2024-01-14")).unwrap();
        let btc = provider.fetch("BTC-USD", "Bitcoin", d("2024-01-01"), d("2024-01-14")).unwrap();
        assert_eq!(gold.series.len(), 10);
        assert_eq!(btc.series.len(), 14);
    }

    #[test]
    fn prices_stay_positive() {
        let provider = SyntheticProvider::new(50.0, 0.0, 0.1);
        let fetched = provider.fetch("X", "X", d("2020-01-01"), d("2024-01-01")).unwrap();
        assert!(fetched.series.prices().all(|p| p > 0.0));
    }

    #[test]
    fn weekend_only_range_is_no_data() {
        let provider = SyntheticProvider::default();
        let err = provider
            .fetch("GC=F", "Gold", d("2024-01-06"), d("2024-01-07"))
            .unwrap_err();
        assert!(matches!(err, DataError::NoData { .. }));
    }
}
