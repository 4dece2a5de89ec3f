//! Data sources consumed by the page controllers
//!
//! Controllers only see the [`StockDataSource`] and [`NewsSource`] traits; the
//! reqwest-backed clients in this module are the production implementations.

pub mod client;
pub mod news;

pub use client::BistApiClient;
pub use news::NewsApiClient;

use crate::error::Result;
use crate::models::{
    BalanceSheet, CashFlow, IncomeStatement, NewsArticle, PaginatedStocks, PricePoint,
    PriceRangeRequest, Sector, SectorInfo, StockFundamentals, StockIdentity,
};
use async_trait::async_trait;

/// Per-domain accessors of the remote stock API
///
/// `get_stock` and `get_stock_info` resolve a missing stock to `Ok(None)`
/// rather than an error so callers can tell "not found" from a failed request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StockDataSource: Send + Sync {
    /// Identity record of one stock
    async fn get_stock(&self, symbol: &str) -> Result<Option<StockIdentity>>;

    /// Fundamentals snapshot of one stock
    async fn get_stock_info(&self, symbol: &str) -> Result<Option<StockFundamentals>>;

    /// Most recent closing price
    async fn get_stock_price(&self, symbol: &str) -> Result<PricePoint>;

    /// Closing prices between two dates, inclusive
    async fn get_price_range(&self, request: &PriceRangeRequest) -> Result<Vec<PricePoint>>;

    /// Fixed 8-point history: today, 1w, 1mo, 3mo, ~6mo, 1y, 3y and 5y ago
    async fn get_predefined_prices(&self, symbol: &str) -> Result<Vec<PricePoint>>;

    /// Quarterly income statements
    async fn get_income_statements(&self, symbol: &str) -> Result<Vec<IncomeStatement>>;

    /// Quarterly balance sheets
    async fn get_balance_sheets(&self, symbol: &str) -> Result<Vec<BalanceSheet>>;

    /// Quarterly cash flow statements
    async fn get_cash_flows(&self, symbol: &str) -> Result<Vec<CashFlow>>;

    /// Identity records whose symbol or name matches `query`
    async fn search_stocks(&self, query: &str) -> Result<Vec<StockIdentity>>;

    /// One page of the screener listing
    async fn get_stocks_with_prices(&self, page: u32, limit: u32) -> Result<PaginatedStocks>;

    /// Every sector
    async fn get_all_sectors(&self) -> Result<Vec<Sector>>;

    /// Sector aggregate with its three largest companies by market cap
    async fn get_sector_info(&self, sector_id: i64) -> Result<SectorInfo>;

    /// Sector a stock belongs to
    async fn get_sector_of_stock(&self, symbol: &str) -> Result<Sector>;
}

/// News lookup by company display name
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn get_news_about(&self, company_name: &str) -> Result<Vec<NewsArticle>>;
}
