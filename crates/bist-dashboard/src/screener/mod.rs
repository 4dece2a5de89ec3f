//! Stock screener: filter, search and sort over one page of the listing

pub mod columns;
pub mod controller;
pub mod filter;
pub mod format;
pub mod performance;
pub mod search;
pub mod sort;

pub use columns::{BASE_COLUMNS, CellValue, Column, ColumnKey, visible_columns};
pub use controller::{LIST_FETCH_FAILURE_MESSAGE, ScreenerController, ScreenerStatus, detail_route};
pub use filter::{DEFAULT_FILTERS, FilterCriteria, Metric, MetricCheck, MetricRange, apply_filters};
pub use format::{ValueFormat, format_cell, format_number};
pub use performance::{PerformancePeriod, Tone, percentage_change};
pub use search::SearchState;
pub use sort::{SortDirection, SortState, sorted_view};
