//! Screener table columns

use crate::error::DashboardError;
use crate::models::StockSummary;
use crate::screener::filter::{FilterCriteria, Metric};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Column identity, also the sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKey {
    Symbol,
    Name,
    Sector,
    CurrentPrice,
    MarketCap,
    Metric(Metric),
}

/// Borrowed cell content of one row
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Number(Option<f64>),
}

impl ColumnKey {
    pub fn value(self, stock: &StockSummary) -> CellValue<'_> {
        match self {
            ColumnKey::Symbol => CellValue::Text(&stock.stock_symbol),
            ColumnKey::Name => CellValue::Text(&stock.name),
            ColumnKey::Sector => CellValue::Text(&stock.sector),
            ColumnKey::CurrentPrice => CellValue::Number(stock.current_price),
            ColumnKey::MarketCap => CellValue::Number(stock.market_cap),
            ColumnKey::Metric(metric) => CellValue::Number(metric.value(stock)),
        }
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, ColumnKey::Symbol | ColumnKey::Name | ColumnKey::Sector)
    }

    pub fn label(self) -> &'static str {
        match self {
            ColumnKey::Symbol => "Symbol",
            ColumnKey::Name => "Name",
            ColumnKey::Sector => "Sector",
            ColumnKey::CurrentPrice => "Price",
            ColumnKey::MarketCap => "Market Cap",
            ColumnKey::Metric(metric) => metric.label(),
        }
    }
}

impl FromStr for ColumnKey {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "symbol" => Ok(ColumnKey::Symbol),
            "name" => Ok(ColumnKey::Name),
            "sector" => Ok(ColumnKey::Sector),
            "price" | "current_price" => Ok(ColumnKey::CurrentPrice),
            "market cap" | "market_cap" | "marketcap" => Ok(ColumnKey::MarketCap),
            _ => s.parse().map(ColumnKey::Metric),
        }
    }
}

/// A rendered table column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: ColumnKey,
    pub label: &'static str,
    pub numeric: bool,
}

impl From<ColumnKey> for Column {
    fn from(key: ColumnKey) -> Self {
        Self {
            key,
            label: key.label(),
            numeric: key.is_numeric(),
        }
    }
}

/// Columns shown before any filter is applied
pub const BASE_COLUMNS: [ColumnKey; 5] = [
    ColumnKey::Symbol,
    ColumnKey::Name,
    ColumnKey::Sector,
    ColumnKey::CurrentPrice,
    ColumnKey::MarketCap,
];

/// Column a filtered metric adds to the table, if any.
///
/// Price and market cap are always visible; volume and day change never get
/// their own column.
pub fn dynamic_column(metric: Metric) -> Option<ColumnKey> {
    match metric {
        Metric::Price | Metric::MarketCap | Metric::Volume | Metric::DayChange => None,
        other => Some(ColumnKey::Metric(other)),
    }
}

/// Base columns followed by one column per actively filtered ratio metric
pub fn visible_columns(criteria: &FilterCriteria) -> Vec<Column> {
    let mut columns: Vec<Column> = BASE_COLUMNS.into_iter().map(Column::from).collect();

    for key in criteria.active_metrics().filter_map(dynamic_column) {
        if !columns.iter().any(|c| c.key == key) {
            columns.push(key.into());
        }
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screener::filter::DEFAULT_FILTERS;

    #[test]
    fn test_base_columns() {
        let columns = visible_columns(&DEFAULT_FILTERS);
        let labels: Vec<_> = columns.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["Symbol", "Name", "Sector", "Price", "Market Cap"]);
        assert!(!columns[0].numeric);
        assert!(columns[3].numeric);
    }

    #[test]
    fn test_filtered_metrics_add_columns_once() {
        let criteria = DEFAULT_FILTERS
            .with_min(Metric::PriceToBook, 0.5)
            .with_max(Metric::PriceToBook, 2.0)
            .with_min(Metric::Price, 10.0)
            .with_max(Metric::QuickRatio, 3.0);

        let keys: Vec<_> = visible_columns(&criteria).into_iter().map(|c| c.key).collect();
        assert_eq!(keys.len(), 7);
        assert_eq!(keys[5], ColumnKey::Metric(Metric::PriceToBook));
        assert_eq!(keys[6], ColumnKey::Metric(Metric::QuickRatio));
    }

    #[test]
    fn test_cell_values() {
        let mut stock = StockSummary::new("AGHOL", "Anadolu Grubu Holding", "Conglomerates");
        stock.trailing_pe = Some(12.7);

        assert_eq!(ColumnKey::Sector.value(&stock), CellValue::Text("Conglomerates"));
        assert_eq!(
            ColumnKey::Metric(Metric::PriceToEarnings).value(&stock),
            CellValue::Number(Some(12.7))
        );
        assert_eq!(ColumnKey::MarketCap.value(&stock), CellValue::Number(None));
    }

    #[test]
    fn test_parse_sort_column() {
        assert_eq!("price".parse::<ColumnKey>().unwrap(), ColumnKey::CurrentPrice);
        assert_eq!("Market Cap".parse::<ColumnKey>().unwrap(), ColumnKey::MarketCap);
        assert!("roe".parse::<ColumnKey>().is_err());
        assert_eq!(
            "returnOnEquity".parse::<ColumnKey>().unwrap(),
            ColumnKey::Metric(Metric::ReturnOnEquity)
        );
    }
}
