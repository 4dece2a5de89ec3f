//! Percentage change over the fixed 8-point price history

use crate::models::PricePoint;
use serde::{Deserialize, Serialize};

/// Look-back period of the predefined history.
///
/// The history is ordered today, 1w, 1mo, 3mo, ~6mo, 1y, 3y, 5y ago; each
/// period reads the point at its offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PerformancePeriod {
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    ThreeYears,
    FiveYears,
}

impl PerformancePeriod {
    pub const ALL: [PerformancePeriod; 7] = [
        PerformancePeriod::OneWeek,
        PerformancePeriod::OneMonth,
        PerformancePeriod::ThreeMonths,
        PerformancePeriod::SixMonths,
        PerformancePeriod::OneYear,
        PerformancePeriod::ThreeYears,
        PerformancePeriod::FiveYears,
    ];

    /// Index of the anchor point in the history
    pub fn offset(self) -> usize {
        match self {
            PerformancePeriod::OneWeek => 1,
            PerformancePeriod::OneMonth => 2,
            PerformancePeriod::ThreeMonths => 3,
            PerformancePeriod::SixMonths => 4,
            PerformancePeriod::OneYear => 5,
            PerformancePeriod::ThreeYears => 6,
            PerformancePeriod::FiveYears => 7,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PerformancePeriod::OneWeek => "1 Week",
            PerformancePeriod::OneMonth => "1 Month",
            PerformancePeriod::ThreeMonths => "3 Months",
            PerformancePeriod::SixMonths => "6 Months",
            PerformancePeriod::OneYear => "1 Year",
            PerformancePeriod::ThreeYears => "3 Years",
            PerformancePeriod::FiveYears => "5 Years",
        }
    }
}

/// Change in percent between today and the period's anchor.
///
/// Fewer than two points yields `Some(0.0)`. A missing anchor, a null close
/// or a zero anchor price yields `None`.
pub fn percentage_change(history: &[PricePoint], period: PerformancePeriod) -> Option<f64> {
    if history.len() < 2 {
        return Some(0.0);
    }

    let today = history.first()?.close_price?;
    let anchor = history.get(period.offset())?.close_price?;
    if anchor == 0.0 {
        return None;
    }

    Some((today - anchor) / anchor * 100.0)
}

/// Colour hint for a signed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    /// Gains are positive; flat and losses are negative
    pub fn for_change(value: Option<f64>) -> Self {
        match value {
            Some(v) if v > 0.0 => Tone::Positive,
            Some(_) => Tone::Negative,
            None => Tone::Neutral,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn history(closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| PricePoint {
                stock_symbol: "AGHOL".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 1, 24).unwrap() - chrono::Days::new(i as u64 * 7),
                close_price: Some(*close),
            })
            .collect()
    }

    #[test]
    fn test_short_history_is_zero() {
        assert_eq!(percentage_change(&[], PerformancePeriod::OneWeek), Some(0.0));
        assert_eq!(percentage_change(&history(&[315.0]), PerformancePeriod::OneYear), Some(0.0));
    }

    #[test]
    fn test_week_and_year_changes() {
        let points = history(&[315.0, 309.0, 363.0, 287.5, 427.25, 227.0, 33.0, 19.0]);

        let week = percentage_change(&points, PerformancePeriod::OneWeek).unwrap();
        assert!((week - 1.941_747_572_8).abs() < 1e-6);

        let year = percentage_change(&points, PerformancePeriod::OneYear).unwrap();
        assert!((year - (315.0 - 227.0) / 227.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_anchor_is_none() {
        let points = history(&[315.0, 309.0, 363.0]);
        assert_eq!(percentage_change(&points, PerformancePeriod::FiveYears), None);

        let mut points = history(&[315.0, 309.0]);
        points[1].close_price = None;
        assert_eq!(percentage_change(&points, PerformancePeriod::OneWeek), None);
    }

    #[test]
    fn test_tone() {
        assert_eq!(Tone::for_change(Some(2.5)), Tone::Positive);
        assert_eq!(Tone::for_change(Some(0.0)), Tone::Negative);
        assert_eq!(Tone::for_change(Some(-1.0)), Tone::Negative);
        assert_eq!(Tone::for_change(None), Tone::Neutral);
    }
}
