//! Stock detail page: range selectors, chart shaping and fetch orchestration

pub mod chart;
pub mod controller;
pub mod range;

pub use chart::{
    BalanceSheetCharts, CashFlowCharts, ChartDataset, IncomeCharts, normalize_price_series,
    price_chart, price_chart_label, shape_chart_dataset,
};
pub use controller::{
    DetailController, DetailState, DetailStatus, Domain, LoadOutcome, RefreshOutcome,
    ordered_history,
};
pub use range::{ChartRange, DateWindow, TimeRange, today_utc};
