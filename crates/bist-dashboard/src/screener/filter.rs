//! Range filters over screener rows
//!
//! Every metric carries an inclusive `[min, max]` range. An unset bound holds
//! the metric's sentinel: `+inf` for every maximum, and for minimums either `0`
//! (metrics that cannot be negative) or `-inf`. A bound equal to its sentinel
//! imposes no constraint, so a row missing that metric still matches.

use crate::error::DashboardError;
use crate::models::StockSummary;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Metrics a [`FilterCriteria`] can constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    Price,
    MarketCap,
    DayChange,
    Volume,
    PriceToEarnings,
    PriceToSales,
    PriceToBook,
    PriceToEbitda,
    NetProfitMargin,
    OperatingMargin,
    GrossProfitMargin,
    ReturnOnAssets,
    ReturnOnEquity,
    DebtToEquity,
    CurrentRatio,
    QuickRatio,
    InterestCoverage,
}

impl Metric {
    /// Number of metrics
    pub const COUNT: usize = 17;

    /// Every metric, in dialog order
    pub const ALL: [Metric; Self::COUNT] = [
        Metric::Price,
        Metric::MarketCap,
        Metric::DayChange,
        Metric::Volume,
        Metric::PriceToEarnings,
        Metric::PriceToSales,
        Metric::PriceToBook,
        Metric::PriceToEbitda,
        Metric::NetProfitMargin,
        Metric::OperatingMargin,
        Metric::GrossProfitMargin,
        Metric::ReturnOnAssets,
        Metric::ReturnOnEquity,
        Metric::DebtToEquity,
        Metric::CurrentRatio,
        Metric::QuickRatio,
        Metric::InterestCoverage,
    ];

    /// Position in [`Metric::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Value of an unset minimum
    pub const fn unbounded_low(self) -> f64 {
        match self {
            Metric::Price | Metric::MarketCap | Metric::Volume | Metric::PriceToEarnings => 0.0,
            _ => f64::NEG_INFINITY,
        }
    }

    /// Value of an unset maximum
    pub const fn unbounded_high(self) -> f64 {
        f64::INFINITY
    }

    /// Whether the row predicate reads this metric.
    ///
    /// Day change and interest coverage can be edited but never exclude a row.
    pub const fn is_filterable(self) -> bool {
        !matches!(self, Metric::DayChange | Metric::InterestCoverage)
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Price => "Price",
            Metric::MarketCap => "Market Cap",
            Metric::DayChange => "Day Change",
            Metric::Volume => "Volume",
            Metric::PriceToEarnings => "Price to Earnings",
            Metric::PriceToSales => "Price to Sales",
            Metric::PriceToBook => "Price to Book",
            Metric::PriceToEbitda => "Price to EBITDA",
            Metric::NetProfitMargin => "Net Profit Margin",
            Metric::OperatingMargin => "Operating Margin",
            Metric::GrossProfitMargin => "Gross Profit Margin",
            Metric::ReturnOnAssets => "Return on Assets",
            Metric::ReturnOnEquity => "Return on Equity",
            Metric::DebtToEquity => "Debt to Equity",
            Metric::CurrentRatio => "Current Ratio",
            Metric::QuickRatio => "Quick Ratio",
            Metric::InterestCoverage => "Interest Coverage",
        }
    }

    /// Field name in the API payload
    pub fn field(self) -> &'static str {
        match self {
            Metric::Price => "current_price",
            Metric::MarketCap => "market_cap",
            Metric::DayChange => "regularMarketChangePercent",
            Metric::Volume => "volume",
            Metric::PriceToEarnings => "trailingPE",
            Metric::PriceToSales => "priceToSalesTrailing12Months",
            Metric::PriceToBook => "priceToBook",
            Metric::PriceToEbitda => "enterpriseToEbitda",
            Metric::NetProfitMargin => "profitMargins",
            Metric::OperatingMargin => "operatingMargins",
            Metric::GrossProfitMargin => "grossMargins",
            Metric::ReturnOnAssets => "returnOnAssets",
            Metric::ReturnOnEquity => "returnOnEquity",
            Metric::DebtToEquity => "debtToEquity",
            Metric::CurrentRatio => "currentRatio",
            Metric::QuickRatio => "quickRatio",
            Metric::InterestCoverage => "interestCoverage",
        }
    }

    /// Read this metric from a row
    pub fn value(self, stock: &StockSummary) -> Option<f64> {
        match self {
            Metric::Price => stock.current_price,
            Metric::MarketCap => stock.market_cap,
            Metric::DayChange => stock.day_change_percent,
            Metric::Volume => stock.volume,
            Metric::PriceToEarnings => stock.trailing_pe,
            Metric::PriceToSales => stock.price_to_sales,
            Metric::PriceToBook => stock.price_to_book,
            Metric::PriceToEbitda => stock.enterprise_to_ebitda,
            Metric::NetProfitMargin => stock.profit_margins,
            Metric::OperatingMargin => stock.operating_margins,
            Metric::GrossProfitMargin => stock.gross_margins,
            Metric::ReturnOnAssets => stock.return_on_assets,
            Metric::ReturnOnEquity => stock.return_on_equity,
            Metric::DebtToEquity => stock.debt_to_equity,
            Metric::CurrentRatio => stock.current_ratio,
            Metric::QuickRatio => stock.quick_ratio,
            Metric::InterestCoverage => stock.interest_coverage,
        }
    }
}

impl FromStr for Metric {
    type Err = DashboardError;

    /// Accepts the label or the wire field name, ignoring case, spaces,
    /// dashes and underscores
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        fn squash(s: &str) -> String {
            s.chars()
                .filter(|c| !matches!(c, ' ' | '-' | '_'))
                .map(|c| c.to_ascii_lowercase())
                .collect()
        }

        let wanted = squash(s);
        Metric::ALL
            .into_iter()
            .find(|m| squash(m.label()) == wanted || squash(m.field()) == wanted)
            .ok_or_else(|| DashboardError::Other(format!("unknown metric: {s}")))
    }
}

/// Inclusive bounds of one metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricRange {
    pub min: f64,
    pub max: f64,
}

/// Outcome of checking one row against one metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricCheck {
    InRange,
    OutOfRange,
    Absent,
}

/// Bounds for every [`Metric`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCriteria {
    ranges: [MetricRange; Metric::COUNT],
}

/// Criteria with every bound at its sentinel.
///
/// Both the initial screener state and "clear filters" use this value.
pub const DEFAULT_FILTERS: FilterCriteria = FilterCriteria::unbounded();

impl Default for FilterCriteria {
    fn default() -> Self {
        DEFAULT_FILTERS
    }
}

impl FilterCriteria {
    /// Criteria that constrain nothing
    pub const fn unbounded() -> Self {
        let mut ranges = [MetricRange {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }; Metric::COUNT];

        let mut i = 0;
        while i < Metric::COUNT {
            ranges[i].min = Metric::ALL[i].unbounded_low();
            ranges[i].max = Metric::ALL[i].unbounded_high();
            i += 1;
        }

        Self { ranges }
    }

    pub fn range(&self, metric: Metric) -> MetricRange {
        self.ranges[metric.index()]
    }

    /// Set the lower bound; `None` or NaN resets it to the sentinel
    pub fn set_min(&mut self, metric: Metric, min: Option<f64>) -> &mut Self {
        self.ranges[metric.index()].min = min
            .filter(|v| !v.is_nan())
            .unwrap_or_else(|| metric.unbounded_low());
        self
    }

    /// Set the upper bound; `None` or NaN resets it to the sentinel
    pub fn set_max(&mut self, metric: Metric, max: Option<f64>) -> &mut Self {
        self.ranges[metric.index()].max = max
            .filter(|v| !v.is_nan())
            .unwrap_or_else(|| metric.unbounded_high());
        self
    }

    /// Builder-style [`FilterCriteria::set_min`]
    pub fn with_min(mut self, metric: Metric, min: f64) -> Self {
        self.set_min(metric, Some(min));
        self
    }

    /// Builder-style [`FilterCriteria::set_max`]
    pub fn with_max(mut self, metric: Metric, max: f64) -> Self {
        self.set_max(metric, Some(max));
        self
    }

    pub fn has_min(&self, metric: Metric) -> bool {
        self.range(metric).min != metric.unbounded_low()
    }

    pub fn has_max(&self, metric: Metric) -> bool {
        self.range(metric).max != metric.unbounded_high()
    }

    /// True when either bound of `metric` differs from its sentinel
    pub fn is_constrained(&self, metric: Metric) -> bool {
        self.has_min(metric) || self.has_max(metric)
    }

    /// Metrics with at least one active bound, in [`Metric::ALL`] order
    pub fn active_metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        Metric::ALL.into_iter().filter(|m| self.is_constrained(*m))
    }

    /// Three-valued check of a single value against the active bounds of `metric`
    pub fn check(&self, metric: Metric, value: Option<f64>) -> MetricCheck {
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            return MetricCheck::Absent;
        };

        let range = self.range(metric);
        let above_min = !self.has_min(metric) || value >= range.min;
        let below_max = !self.has_max(metric) || value <= range.max;

        if above_min && below_max {
            MetricCheck::InRange
        } else {
            MetricCheck::OutOfRange
        }
    }

    /// Whether `stock` satisfies every filterable metric.
    ///
    /// A metric left at its sentinels passes regardless of the row's value;
    /// an active metric passes only when the value is present and in range.
    pub fn matches(&self, stock: &StockSummary) -> bool {
        Metric::ALL
            .into_iter()
            .filter(|m| m.is_filterable() && self.is_constrained(*m))
            .all(|m| self.check(m, m.value(stock)) == MetricCheck::InRange)
    }
}

/// Rows of `stocks` that satisfy `criteria`, in input order
pub fn apply_filters(stocks: &[StockSummary], criteria: &FilterCriteria) -> Vec<StockSummary> {
    stocks
        .iter()
        .filter(|stock| criteria.matches(stock))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stock(symbol: &str, price: Option<f64>) -> StockSummary {
        let mut s = StockSummary::new(symbol, symbol, "Banks");
        s.current_price = price;
        s
    }

    #[test]
    fn test_parse_metric_names() {
        assert_eq!("price".parse::<Metric>().unwrap(), Metric::Price);
        assert_eq!("Market Cap".parse::<Metric>().unwrap(), Metric::MarketCap);
        assert_eq!("trailingPE".parse::<Metric>().unwrap(), Metric::PriceToEarnings);
        assert_eq!("debt-to-equity".parse::<Metric>().unwrap(), Metric::DebtToEquity);
        assert!("dividend".parse::<Metric>().is_err());
    }

    #[test]
    fn test_metric_table_is_consistent() {
        for (i, metric) in Metric::ALL.iter().enumerate() {
            assert_eq!(metric.index(), i);
        }
    }

    #[test]
    fn test_default_is_unconstrained() {
        let criteria = DEFAULT_FILTERS;
        assert_eq!(criteria.active_metrics().count(), 0);
        assert_eq!(criteria.range(Metric::Price).min, 0.0);
        assert_eq!(criteria.range(Metric::PriceToBook).min, f64::NEG_INFINITY);
        assert_eq!(criteria.range(Metric::QuickRatio).max, f64::INFINITY);
        assert_eq!(FilterCriteria::default(), DEFAULT_FILTERS);
    }

    #[test]
    fn test_unbounded_criteria_is_identity() {
        let bare = StockSummary::new("NULL", "No data", "");
        let stocks = vec![stock("AAA", Some(10.0)), bare, stock("CCC", Some(-1.0))];

        assert_eq!(apply_filters(&stocks, &DEFAULT_FILTERS), stocks);
    }

    #[test]
    fn test_min_price_filter() {
        let stocks = vec![stock("AAA", Some(10.0)), stock("BBB", Some(20.0))];
        let criteria = DEFAULT_FILTERS.with_min(Metric::Price, 15.0);

        let filtered = apply_filters(&stocks, &criteria);
        assert_eq!(filtered, vec![stock("BBB", Some(20.0))]);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let stocks = vec![
            stock("LOW", Some(10.0)),
            stock("MID", Some(15.0)),
            stock("TOP", Some(20.0)),
        ];
        let criteria = DEFAULT_FILTERS
            .with_min(Metric::Price, 10.0)
            .with_max(Metric::Price, 15.0);

        let symbols: Vec<_> = apply_filters(&stocks, &criteria)
            .into_iter()
            .map(|s| s.stock_symbol)
            .collect();
        assert_eq!(symbols, vec!["LOW", "MID"]);
    }

    #[test]
    fn test_missing_value_excluded_only_when_constrained() {
        let stocks = vec![stock("AAA", Some(10.0)), stock("NONE", None)];

        let open = apply_filters(&stocks, &DEFAULT_FILTERS);
        assert_eq!(open.len(), 2);

        let constrained = DEFAULT_FILTERS.with_max(Metric::Price, 100.0);
        let filtered = apply_filters(&stocks, &constrained);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].stock_symbol, "AAA");
    }

    #[test]
    fn test_zero_min_on_signed_metric_is_active() {
        let mut negative = StockSummary::new("NEG", "Neg", "");
        negative.profit_margins = Some(-0.05);
        let mut positive = StockSummary::new("POS", "Pos", "");
        positive.profit_margins = Some(0.12);

        let criteria = DEFAULT_FILTERS.with_min(Metric::NetProfitMargin, 0.0);
        assert!(criteria.is_constrained(Metric::NetProfitMargin));

        let filtered = apply_filters(&[negative, positive], &criteria);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].stock_symbol, "POS");
    }

    #[test]
    fn test_zero_min_on_unsigned_metric_is_sentinel() {
        let criteria = DEFAULT_FILTERS.with_min(Metric::PriceToEarnings, 0.0);
        assert!(!criteria.is_constrained(Metric::PriceToEarnings));
    }

    #[test]
    fn test_interest_coverage_is_not_filtered() {
        let mut s = StockSummary::new("ICOV", "Coverage", "");
        s.interest_coverage = Some(1.0);

        let criteria = DEFAULT_FILTERS.with_min(Metric::InterestCoverage, 5.0);
        assert!(criteria.is_constrained(Metric::InterestCoverage));
        assert_eq!(apply_filters(&[s], &criteria).len(), 1);
    }

    #[test]
    fn test_three_valued_check() {
        let criteria = DEFAULT_FILTERS.with_max(Metric::DebtToEquity, 50.0);
        assert_eq!(criteria.check(Metric::DebtToEquity, Some(44.2)), MetricCheck::InRange);
        assert_eq!(criteria.check(Metric::DebtToEquity, Some(80.0)), MetricCheck::OutOfRange);
        assert_eq!(criteria.check(Metric::DebtToEquity, None), MetricCheck::Absent);
        assert_eq!(criteria.check(Metric::DebtToEquity, Some(f64::NAN)), MetricCheck::Absent);
    }

    #[test]
    fn test_reset_bound_with_none() {
        let mut criteria = DEFAULT_FILTERS.with_min(Metric::Volume, 1000.0);
        assert!(criteria.has_min(Metric::Volume));

        criteria.set_min(Metric::Volume, None);
        assert_eq!(criteria, DEFAULT_FILTERS);
    }
}
