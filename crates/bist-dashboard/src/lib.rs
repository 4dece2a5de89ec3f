//! BIST stock dashboard core
//!
//! This crate holds the data pipeline behind a Borsa Istanbul screening
//! dashboard. It includes:
//!
//! - Typed access to the stock API (listing, identity, fundamentals, prices,
//!   financial statements, sectors) and to a news endpoint
//! - The screener pipeline: per-metric range filters, search over the current
//!   page, stable column sorting and page navigation
//! - Detail page orchestration: identity and fundamentals first, then an
//!   isolated fan-out to every secondary domain
//! - Chart dataset shaping for prices and quarterly statements
//! - Configuration of the technical analysis widget and its one-time script load
//!
//! # Architecture
//!
//! Both page controllers depend on the [`StockDataSource`] trait rather than
//! on HTTP directly. [`BistApiClient`] is the production implementation:
//! - `ScreenerController`: one page of the listing plus filter/search/sort state
//! - `DetailController`: per-symbol fetches with stale-response protection
//!
//! # Example
//!
//! ```rust,ignore
//! use bist_dashboard::{BistApiClient, DashboardConfig, ScreenerController};
//! use bist_dashboard::screener::Metric;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DashboardConfig::default();
//!     let client = Arc::new(BistApiClient::new(&config)?);
//!
//!     let mut screener = ScreenerController::new(client, config.items_per_page);
//!     screener.load_page(1).await?;
//!
//!     screener.open_filters();
//!     screener.pending_filters_mut().set_min(Metric::Price, Some(15.0));
//!     screener.apply_filters();
//!
//!     for stock in screener.rows() {
//!         println!("{} {:?}", stock.stock_symbol, stock.current_price);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod detail;
pub mod error;
pub mod models;
pub mod screener;
pub mod widget;

// Re-export main types for convenience
pub use api::{BistApiClient, NewsApiClient, NewsSource, StockDataSource};
pub use config::DashboardConfig;
pub use detail::{ChartRange, DetailController, DetailState, DetailStatus, TimeRange};
pub use error::{DashboardError, ErrorKind, Result};
pub use screener::{FilterCriteria, ScreenerController, ScreenerStatus};
pub use widget::{WidgetConfig, WidgetLoader};
