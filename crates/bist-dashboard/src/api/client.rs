//! reqwest client for the stock API

use crate::api::StockDataSource;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::models::{
    BalanceSheet, CashFlow, IncomeStatement, PaginatedStocks, PricePoint, PriceRangeRequest,
    Sector, SectorInfo, StockFundamentals, StockIdentity,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

/// Client for the `/api/stocks` HTTP API
#[derive(Debug, Clone)]
pub struct BistApiClient {
    client: Client,
    base_url: Url,
}

impl BistApiClient {
    /// Create a client from a validated configuration
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: Url::parse(config.api_base())?,
        })
    }

    /// Create a client with default settings against `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let config = DashboardConfig::builder().api_base_url(base_url).build()?;
        Self::new(&config)
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append escaped path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                DashboardError::ConfigError(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        decode(response).await
    }

    /// GET that resolves 404 to `None`
    async fn get_optional<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(DashboardError::Api {
            status: status.as_u16(),
            message,
        });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl StockDataSource for BistApiClient {
    async fn get_stock(&self, symbol: &str) -> Result<Option<StockIdentity>> {
        // The API answers an unknown symbol with 404 or a JSON null
        let found: Option<Option<StockIdentity>> =
            self.get_optional(self.endpoint(&[symbol])?).await?;
        Ok(found.flatten())
    }

    async fn get_stock_info(&self, symbol: &str) -> Result<Option<StockFundamentals>> {
        let found: Option<Option<StockFundamentals>> =
            self.get_optional(self.endpoint(&[symbol, "info"])?).await?;
        Ok(found.flatten())
    }

    async fn get_stock_price(&self, symbol: &str) -> Result<PricePoint> {
        self.get_json(self.endpoint(&[symbol, "price"])?).await
    }

    async fn get_price_range(&self, request: &PriceRangeRequest) -> Result<Vec<PricePoint>> {
        let url = self.endpoint(&["prices-range"])?;
        tracing::debug!(%url, symbol = %request.stock_symbol, "POST");
        let response = self.client.post(url).json(request).send().await?;
        decode(response).await
    }

    async fn get_predefined_prices(&self, symbol: &str) -> Result<Vec<PricePoint>> {
        self.get_json(self.endpoint(&[symbol, "prices"])?).await
    }

    async fn get_income_statements(&self, symbol: &str) -> Result<Vec<IncomeStatement>> {
        self.get_json(self.endpoint(&["financials", symbol])?).await
    }

    async fn get_balance_sheets(&self, symbol: &str) -> Result<Vec<BalanceSheet>> {
        self.get_json(self.endpoint(&["balance-sheet", symbol])?).await
    }

    async fn get_cash_flows(&self, symbol: &str) -> Result<Vec<CashFlow>> {
        self.get_json(self.endpoint(&["cash-flow", symbol])?).await
    }

    async fn search_stocks(&self, query: &str) -> Result<Vec<StockIdentity>> {
        self.get_json(self.endpoint(&["search", query])?).await
    }

    async fn get_stocks_with_prices(&self, page: u32, limit: u32) -> Result<PaginatedStocks> {
        let mut url = self.endpoint(&["with-prices"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        self.get_json(url).await
    }

    async fn get_all_sectors(&self) -> Result<Vec<Sector>> {
        // The route requires a path segment it never reads
        self.get_json(self.endpoint(&["sectors-all", "x"])?).await
    }

    async fn get_sector_info(&self, sector_id: i64) -> Result<SectorInfo> {
        self.get_json(self.endpoint(&["sector-info", &sector_id.to_string()])?)
            .await
    }

    async fn get_sector_of_stock(&self, symbol: &str) -> Result<Sector> {
        self.get_json(self.endpoint(&["sector", symbol])?).await
    }
}
