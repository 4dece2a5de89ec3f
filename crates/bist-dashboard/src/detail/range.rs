//! Date range selectors for the detail page
//!
//! Two vocabularies exist side by side. [`ChartRange`] drives the price
//! chart; [`TimeRange`] drives the raw price history slice. They share some
//! tokens but are kept as separate types so one can never be handed to the
//! other's fetch.

use crate::error::{DashboardError, Result};
use chrono::{Datelike, Months, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

/// Inclusive start/end dates sent to the price range endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Today's date in UTC, the calendar the API stores prices in
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

fn months_back(today: NaiveDate, months: u32) -> NaiveDate {
    // Clamps to the last day of a shorter month (Mar 31 -> Feb 28)
    today
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

fn start_of_year(today: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today)
}

/// Price chart range selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChartRange {
    #[default]
    OneMonth,
    OneWeek,
    YearToDate,
    OneYear,
    FiveYears,
}

impl ChartRange {
    pub const ALL: [Self; 5] = [
        Self::OneWeek,
        Self::OneMonth,
        Self::YearToDate,
        Self::OneYear,
        Self::FiveYears,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::YearToDate => "YTD",
            Self::OneYear => "1Y",
            Self::FiveYears => "5Y",
        }
    }

    pub fn start_date(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::OneWeek => today - chrono::Duration::days(7),
            Self::OneMonth => months_back(today, 1),
            Self::YearToDate => start_of_year(today),
            Self::OneYear => months_back(today, 12),
            Self::FiveYears => months_back(today, 60),
        }
    }

    pub fn window(self, today: NaiveDate) -> DateWindow {
        DateWindow {
            start: self.start_date(today),
            end: today,
        }
    }
}

impl fmt::Display for ChartRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ChartRange {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|range| range.token().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashboardError::InvalidRange(s.to_string()))
    }
}

/// Price history range selector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TimeRange {
    OneDay,
    OneWeek,
    #[default]
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    /// Everything since the start of the stored history
    All,
}

impl TimeRange {
    pub const ALL: [Self; 7] = [
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
        Self::All,
    ];

    /// First day of stored price history
    pub const HISTORY_START: NaiveDate = match NaiveDate::from_ymd_opt(2020, 1, 1) {
        Some(date) => date,
        None => NaiveDate::MIN,
    };

    pub fn token(self) -> &'static str {
        match self {
            Self::OneDay => "1D",
            Self::OneWeek => "1W",
            Self::OneMonth => "1M",
            Self::ThreeMonths => "3M",
            Self::SixMonths => "6M",
            Self::OneYear => "1Y",
            Self::All => "ALL",
        }
    }

    pub fn start_date(self, today: NaiveDate) -> NaiveDate {
        match self {
            Self::OneDay => today - chrono::Duration::days(1),
            Self::OneWeek => today - chrono::Duration::days(7),
            Self::OneMonth => months_back(today, 1),
            Self::ThreeMonths => months_back(today, 3),
            Self::SixMonths => months_back(today, 6),
            Self::OneYear => months_back(today, 12),
            Self::All => Self::HISTORY_START,
        }
    }

    pub fn window(self, today: NaiveDate) -> DateWindow {
        DateWindow {
            start: self.start_date(today),
            end: today,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for TimeRange {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|range| range.token().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DashboardError::InvalidRange(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_chart_range_windows() {
        let today = date(2024, 6, 15);
        assert_eq!(ChartRange::OneWeek.start_date(today), date(2024, 6, 8));
        assert_eq!(ChartRange::OneMonth.start_date(today), date(2024, 5, 15));
        assert_eq!(ChartRange::YearToDate.start_date(today), date(2024, 1, 1));
        assert_eq!(ChartRange::OneYear.start_date(today), date(2023, 6, 15));
        assert_eq!(ChartRange::FiveYears.start_date(today), date(2019, 6, 15));

        let window = ChartRange::OneMonth.window(today);
        assert_eq!(window.end, today);
    }

    #[test]
    fn test_month_arithmetic_clamps() {
        assert_eq!(ChartRange::OneMonth.start_date(date(2024, 3, 31)), date(2024, 2, 29));
        assert_eq!(TimeRange::ThreeMonths.start_date(date(2023, 5, 31)), date(2023, 2, 28));
    }

    #[test]
    fn test_time_range_windows() {
        let today = date(2024, 6, 15);
        assert_eq!(TimeRange::OneDay.start_date(today), date(2024, 6, 14));
        assert_eq!(TimeRange::SixMonths.start_date(today), date(2023, 12, 15));
        assert_eq!(TimeRange::All.start_date(today), date(2020, 1, 1));
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!("ytd".parse::<ChartRange>().unwrap(), ChartRange::YearToDate);
        assert_eq!("5Y".parse::<ChartRange>().unwrap(), ChartRange::FiveYears);
        assert_eq!("ALL".parse::<TimeRange>().unwrap(), TimeRange::All);

        // Each vocabulary only knows its own tokens
        assert!("3M".parse::<ChartRange>().is_err());
        assert!("YTD".parse::<TimeRange>().is_err());
        assert!(matches!(
            "2W".parse::<TimeRange>(),
            Err(DashboardError::InvalidRange(token)) if token == "2W"
        ));
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ChartRange::default(), ChartRange::OneMonth);
        assert_eq!(TimeRange::default(), TimeRange::OneMonth);
        assert_eq!(ChartRange::default().to_string(), "1M");
    }
}
