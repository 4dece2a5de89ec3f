//! Chart dataset shaping
//!
//! Every chart on the detail page is a single labelled series: one label
//! per period and one value per label, in input order. Missing values stay
//! `None` so they render as gaps instead of zeros.

use crate::models::{BalanceSheet, CashFlow, IncomeStatement, PricePoint};
use serde::{Deserialize, Serialize};

/// A single labelled series ready for a line or bar chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub labels: Vec<String>,
    pub data: Vec<Option<f64>>,
}

impl ChartDataset {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterate `(period, value)` pairs
    pub fn points(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.data.iter().copied())
    }
}

/// Project `series` into a dataset, one point per record, preserving order.
pub fn shape_chart_dataset<T>(
    series: &[T],
    label: impl Into<String>,
    period: impl Fn(&T) -> String,
    value: impl Fn(&T) -> Option<f64>,
) -> ChartDataset {
    ChartDataset {
        label: label.into(),
        labels: series.iter().map(&period).collect(),
        data: series.iter().map(&value).collect(),
    }
}

/// Order prices oldest first.
///
/// The sort is stable, so input that is already ascending comes back
/// unchanged and same-day duplicates keep their relative order.
pub fn normalize_price_series(mut points: Vec<PricePoint>) -> Vec<PricePoint> {
    points.sort_by(|a, b| a.date.cmp(&b.date));
    points
}

/// Title of the price chart: the company name, falling back to the symbol
pub fn price_chart_label(name: Option<&str>, symbol: &str) -> String {
    let subject = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(symbol);
    format!("{subject} Stock Price")
}

/// Shape a price series into the chart dataset, normalizing order first
pub fn price_chart(points: Vec<PricePoint>, label: impl Into<String>) -> ChartDataset {
    let points = normalize_price_series(points);
    shape_chart_dataset(
        &points,
        label,
        |p| p.date.format("%Y-%m-%d").to_string(),
        |p| p.close_price,
    )
}

/// The five income statement charts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeCharts {
    pub revenue: ChartDataset,
    pub operating_income: ChartDataset,
    pub operating_margin: ChartDataset,
    pub gross_profit: ChartDataset,
    pub net_profit: ChartDataset,
}

impl IncomeCharts {
    pub fn from_statements(statements: &[IncomeStatement]) -> Self {
        let quarter = |s: &IncomeStatement| s.quarter.clone();
        Self {
            revenue: shape_chart_dataset(statements, "Revenue", quarter, |s| s.revenue),
            operating_income: shape_chart_dataset(statements, "Operating Income", quarter, |s| {
                s.operating_income
            }),
            operating_margin: shape_chart_dataset(statements, "Operating Margin", quarter, |s| {
                s.operating_margin
            }),
            gross_profit: shape_chart_dataset(statements, "Gross Profit", quarter, |s| {
                s.gross_profit
            }),
            net_profit: shape_chart_dataset(statements, "Net Profit", quarter, |s| s.net_profit),
        }
    }

    pub fn datasets(&self) -> [&ChartDataset; 5] {
        [
            &self.revenue,
            &self.operating_income,
            &self.operating_margin,
            &self.gross_profit,
            &self.net_profit,
        ]
    }
}

/// The five balance sheet charts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetCharts {
    pub total_assets: ChartDataset,
    pub total_liabilities: ChartDataset,
    pub total_equity: ChartDataset,
    pub current_assets: ChartDataset,
    pub current_liabilities: ChartDataset,
}

impl BalanceSheetCharts {
    pub fn from_sheets(sheets: &[BalanceSheet]) -> Self {
        let quarter = |s: &BalanceSheet| s.quarter.clone();
        Self {
            total_assets: shape_chart_dataset(sheets, "Total Assets", quarter, |s| s.total_assets),
            total_liabilities: shape_chart_dataset(sheets, "Total Liabilities", quarter, |s| {
                s.total_liabilities
            }),
            total_equity: shape_chart_dataset(sheets, "Total Equity", quarter, |s| s.total_equity),
            current_assets: shape_chart_dataset(sheets, "Current Assets", quarter, |s| {
                s.current_assets
            }),
            current_liabilities: shape_chart_dataset(sheets, "Current Liabilities", quarter, |s| {
                s.current_liabilities
            }),
        }
    }

    pub fn datasets(&self) -> [&ChartDataset; 5] {
        [
            &self.total_assets,
            &self.total_liabilities,
            &self.total_equity,
            &self.current_assets,
            &self.current_liabilities,
        ]
    }
}

/// Cash flow charts; only free cash flow is plotted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CashFlowCharts {
    pub free_cash_flow: ChartDataset,
}

impl CashFlowCharts {
    pub fn from_statements(statements: &[CashFlow]) -> Self {
        Self {
            free_cash_flow: shape_chart_dataset(
                statements,
                "Free Cash Flow",
                |s| s.quarter.clone(),
                |s| s.free_cash_flow,
            ),
        }
    }

    pub fn datasets(&self) -> [&ChartDataset; 1] {
        [&self.free_cash_flow]
    }
}
