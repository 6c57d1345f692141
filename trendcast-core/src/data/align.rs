//! Two-series time alignment.
//!
//! Inner join on date: only dates present in both series survive. No
//! forward-fill and no placeholder values, so both outputs share one date
//! axis and every row is a real observation.

use crate::domain::{PricePoint, TimeSeries};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Two series restricted to their common dates.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPair {
    /// The common date axis (sorted ascending).
    pub dates: Vec<NaiveDate>,
    pub first: TimeSeries,
    pub second: TimeSeries,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Inner-join two series on date, preserving chronological order.
pub fn align_inner(first: &TimeSeries, second: &TimeSeries) -> AlignedPair {
    let lookup: HashMap<NaiveDate, f64> = second
        .points()
        .iter()
        .map(|p| (p.date, p.price))
        .collect();

    let mut dates = Vec::new();
    let mut first_points = Vec::new();
    let mut second_points = Vec::new();

    // `first` is already strictly increasing, so the output is too.
    for point in first.points() {
        if let Some(&other) = lookup.get(&point.date) {
            dates.push(point.date);
            first_points.push(*point);
            second_points.push(PricePoint::new(point.date, other));
        }
    }

    tracing::info!(
        first = first.label(),
        second = second.label(),
        first_rows = first.len(),
        second_rows = second.len(),
        joined = dates.len(),
        "aligned series"
    );

    AlignedPair {
        dates,
        first: first.subsequence(first_points),
        second: second.subsequence(second_points),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(label: &str, rows: &[(&str, f64)]) -> TimeSeries {
        let points = rows
            .iter()
            .map(|(d, p)| {
                PricePoint::new(NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(), *p)
            })
            .collect();
        TimeSeries::new(label, points).unwrap()
    }

    #[test]
    fn keeps_only_shared_dates() {
        let gold = series(
            "Gold",
            &[
                ("2024-01-01", 1.0),
                ("2024-01-02", 2.0),
                ("2024-01-03", 3.0),
                ("2024-01-04", 4.0),
                ("2024-01-05", 5.0),
            ],
        );
        let btc = series(
            "Bitcoin",
            &[
                ("2024-01-03", 30.0),
                ("2024-01-04", 40.0),
                ("2024-01-05", 50.0),
                ("2024-01-06", 60.0),
                ("2024-01-07", 70.0),
            ],
        );

        let aligned = align_inner(&gold, &btc);
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned.first.prices().collect::<Vec<_>>(), vec![3.0, 4.0, 5.0]);
        assert_eq!(aligned.second.prices().collect::<Vec<_>>(), vec![30.0, 40.0, 50.0]);
        assert_eq!(aligned.first.label(), "Gold");
        assert_eq!(aligned.second.label(), "Bitcoin");
    }

    #[test]
    fn interleaved_gaps_on_both_sides() {
        let a = series("A", &[("2024-01-01", 1.0), ("2024-01-03", 3.0), ("2024-01-05", 5.0)]);
        let b = series("B", &[("2024-01-02", 2.0), ("2024-01-03", 3.5), ("2024-01-05", 5.5)]);
        let aligned = align_inner(&a, &b);
        let dates: Vec<String> = aligned.dates.iter().map(|d| d.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-05"]);
        assert_eq!(aligned.first.dates().collect::<Vec<_>>(), aligned.dates);
        assert_eq!(aligned.second.dates().collect::<Vec<_>>(), aligned.dates);
    }

    #[test]
    fn disjoint_series_align_to_empty() {
        let a = series("A", &[("2024-01-01", 1.0)]);
        let b = series("B", &[("2024-01-02", 2.0)]);
        let aligned = align_inner(&a, &b);
        assert!(aligned.is_empty());
        assert!(aligned.first.is_empty());
        assert!(aligned.second.is_empty());
    }
}
