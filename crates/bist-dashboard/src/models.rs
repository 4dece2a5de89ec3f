//! Wire models for the stock API
//!
//! The API serialises decimal columns as JSON strings (`"close_price": "314.5"`),
//! so every numeric field goes through [`lenient`] and accepts a number, a
//! numeric string or `null`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Deserializers tolerant of the API's mixed numeric encodings
pub mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Numeric {
        Number(f64),
        Text(String),
    }

    /// Number, numeric string, empty string or null into `Option<f64>`.
    ///
    /// Non-finite values and unparsable strings decode as `None`.
    pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Numeric>::deserialize(deserializer)?;
        Ok(match value {
            Some(Numeric::Number(n)) => Some(n),
            Some(Numeric::Text(s)) => s.trim().parse::<f64>().ok(),
            None => None,
        }
        .filter(|n| n.is_finite()))
    }
}

/// Stock identity record (`GET /{symbol}`, search results, sector top lists)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockIdentity {
    pub stock_symbol: String,
    pub name: String,
    pub sector_id: i64,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<NaiveDateTime>,
}

/// One row of the paginated screener listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSummary {
    pub stock_symbol: String,
    pub name: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub volume: Option<f64>,
    #[serde(default, rename = "regularMarketChangePercent", deserialize_with = "lenient::opt_f64")]
    pub day_change_percent: Option<f64>,
    #[serde(default, rename = "trailingPE", deserialize_with = "lenient::opt_f64")]
    pub trailing_pe: Option<f64>,
    #[serde(default, rename = "priceToSalesTrailing12Months", deserialize_with = "lenient::opt_f64")]
    pub price_to_sales: Option<f64>,
    #[serde(default, rename = "priceToBook", deserialize_with = "lenient::opt_f64")]
    pub price_to_book: Option<f64>,
    #[serde(default, rename = "enterpriseToEbitda", deserialize_with = "lenient::opt_f64")]
    pub enterprise_to_ebitda: Option<f64>,
    #[serde(default, rename = "profitMargins", deserialize_with = "lenient::opt_f64")]
    pub profit_margins: Option<f64>,
    #[serde(default, rename = "operatingMargins", deserialize_with = "lenient::opt_f64")]
    pub operating_margins: Option<f64>,
    #[serde(default, rename = "grossMargins", deserialize_with = "lenient::opt_f64")]
    pub gross_margins: Option<f64>,
    #[serde(default, rename = "returnOnAssets", deserialize_with = "lenient::opt_f64")]
    pub return_on_assets: Option<f64>,
    #[serde(default, rename = "returnOnEquity", deserialize_with = "lenient::opt_f64")]
    pub return_on_equity: Option<f64>,
    #[serde(default, rename = "debtToEquity", deserialize_with = "lenient::opt_f64")]
    pub debt_to_equity: Option<f64>,
    #[serde(default, rename = "currentRatio", deserialize_with = "lenient::opt_f64")]
    pub current_ratio: Option<f64>,
    #[serde(default, rename = "quickRatio", deserialize_with = "lenient::opt_f64")]
    pub quick_ratio: Option<f64>,
    #[serde(default, rename = "interestCoverage", deserialize_with = "lenient::opt_f64")]
    pub interest_coverage: Option<f64>,
}

impl StockSummary {
    /// Summary with only identity fields set
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, sector: impl Into<String>) -> Self {
        Self {
            stock_symbol: symbol.into(),
            name: name.into(),
            sector: sector.into(),
            current_price: None,
            market_cap: None,
            last_updated: None,
            volume: None,
            day_change_percent: None,
            trailing_pe: None,
            price_to_sales: None,
            price_to_book: None,
            enterprise_to_ebitda: None,
            profit_margins: None,
            operating_margins: None,
            gross_margins: None,
            return_on_assets: None,
            return_on_equity: None,
            debt_to_equity: None,
            current_ratio: None,
            quick_ratio: None,
            interest_coverage: None,
        }
    }
}

/// `GET /with-prices?page&limit`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedStocks {
    pub data: Vec<StockSummary>,
    pub total: u64,
    pub page: u32,
    pub pages: u32,
    pub limit: u32,
}

/// Fundamentals snapshot (`GET /{symbol}/info`)
///
/// Only the fields the dashboard reads are typed; everything else the API
/// sends is kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFundamentals {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub recommendation_key: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub current_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub previous_close: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub open: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub day_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub day_high: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub fifty_two_week_low: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub fifty_two_week_high: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub fifty_day_average: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub two_hundred_day_average: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub average_volume: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub market_cap: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub enterprise_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub beta: Option<f64>,

    #[serde(default, rename = "trailingPE", deserialize_with = "lenient::opt_f64")]
    pub trailing_pe: Option<f64>,
    #[serde(default, rename = "forwardPE", deserialize_with = "lenient::opt_f64")]
    pub forward_pe: Option<f64>,
    #[serde(default, rename = "priceToSalesTrailing12Months", deserialize_with = "lenient::opt_f64")]
    pub price_to_sales: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price_to_book: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub enterprise_to_revenue: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub enterprise_to_ebitda: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub profit_margins: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub gross_margins: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub operating_margins: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub ebitda_margins: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub return_on_assets: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub return_on_equity: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub debt_to_equity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub current_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub quick_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_cash: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_debt: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_revenue: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub ebitda: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub free_cashflow: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub operating_cashflow: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub book_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub trailing_eps: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub forward_eps: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub dividend_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub dividend_yield: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub payout_ratio: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub target_mean_price: Option<f64>,
    #[serde(default, rename = "52WeekChange", deserialize_with = "lenient::opt_f64")]
    pub fifty_two_week_change: Option<f64>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl StockFundamentals {
    /// Name used to look up news: short name, then long name
    pub fn display_name(&self) -> Option<&str> {
        [self.short_name.as_deref(), self.long_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
    }
}

/// One closing price (`GET /{symbol}/price`, `/{symbol}/prices`, `POST /prices-range`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub stock_symbol: String,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub close_price: Option<f64>,
}

/// Body of `POST /prices-range`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRangeRequest {
    pub stock_symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Quarterly income statement (`GET /financials/{symbol}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStatement {
    pub stock_symbol: String,
    pub quarter: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub revenue: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub gross_profit: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub operating_income: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub net_profit: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub eps: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub operating_margin: Option<f64>,
}

/// Quarterly balance sheet (`GET /balance-sheet/{symbol}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheet {
    pub stock_symbol: String,
    pub quarter: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_assets: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_liabilities: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_equity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub current_assets: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub current_liabilities: Option<f64>,
}

/// Quarterly cash flow statement (`GET /cash-flow/{symbol}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub stock_symbol: String,
    pub quarter: String,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub operating_cash_flow: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub investing_cash_flow: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub financing_cash_flow: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub free_cash_flow: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub capital_expenditures: Option<f64>,
}

/// Sector record (`GET /sectors-all/x`, `GET /sector/{symbol}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub sector_id: i64,
    pub name: String,
}

/// Sector aggregate (`GET /sector-info/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorInfo {
    pub sector: Sector,
    pub number_of_companies: u64,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub total_market_cap: Option<f64>,
    #[serde(default)]
    pub top_3_companies: Vec<StockIdentity>,
}

/// News article; only the commonly present fields are typed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewsArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
