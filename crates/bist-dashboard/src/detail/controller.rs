//! Detail page controller
//!
//! Loading a symbol resolves identity and fundamentals one after the other,
//! then fans out to every secondary domain at once. Each secondary branch
//! fails on its own: a failure is logged, recorded in
//! [`DetailState::degraded`] and leaves its siblings untouched.
//!
//! Responses are tagged with the navigation they were issued for, and
//! price chart responses also with a chart epoch. A response whose tag is no
//! longer current is dropped, so a slow reply for an old symbol or an old
//! range never overwrites newer data.

use crate::api::{NewsSource, StockDataSource};
use crate::detail::chart::{
    BalanceSheetCharts, CashFlowCharts, ChartDataset, IncomeCharts, normalize_price_series,
    price_chart, price_chart_label,
};
use crate::detail::range::{ChartRange, TimeRange, today_utc};
use crate::error::{ErrorKind, Result};
use crate::models::{NewsArticle, PricePoint, PriceRangeRequest, StockFundamentals, StockIdentity};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Independently fetched piece of the detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
    Identity,
    Fundamentals,
    News,
    LatestPrice,
    PriceChart,
    PriceHistory,
    IncomeStatement,
    BalanceSheet,
    CashFlow,
}

impl Domain {
    pub fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Fundamentals => "fundamentals",
            Self::News => "news",
            Self::LatestPrice => "latest_price",
            Self::PriceChart => "price_chart",
            Self::PriceHistory => "price_history",
            Self::IncomeStatement => "income_statement",
            Self::BalanceSheet => "balance_sheet",
            Self::CashFlow => "cash_flow",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DetailStatus {
    /// Nothing requested yet
    #[default]
    Idle,
    Loading,
    /// Identity or fundamentals missing; nothing else is fetched
    NotFound,
    /// Identity and fundamentals are present; secondary domains may still be arriving
    Loaded,
}

/// Result of [`DetailController::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    NotFound,
    /// A newer navigation started before this one finished
    Superseded,
}

/// Result of a range refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A newer request won the race; the response was dropped
    Stale,
    /// No stock identity has loaded yet
    Skipped,
}

/// Everything the detail page renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub symbol: String,
    pub status: DetailStatus,
    pub identity: Option<StockIdentity>,
    pub fundamentals: Option<StockFundamentals>,
    pub latest_price: Option<f64>,
    pub news: Option<Vec<NewsArticle>>,
    pub chart_range: ChartRange,
    pub price_chart: Option<ChartDataset>,
    pub time_range: TimeRange,
    /// Raw rows for the selected [`TimeRange`], as returned by the API
    pub price_history: Option<Vec<PricePoint>>,
    pub income: Option<IncomeCharts>,
    pub balance_sheet: Option<BalanceSheetCharts>,
    pub cash_flow: Option<CashFlowCharts>,
    /// Domains whose last fetch failed
    pub degraded: BTreeSet<Domain>,
}

impl DetailState {
    fn loading(symbol: &str, chart_range: ChartRange) -> Self {
        Self {
            symbol: symbol.to_string(),
            status: DetailStatus::Loading,
            chart_range,
            ..Self::default()
        }
    }

    pub fn is_degraded(&self, domain: Domain) -> bool {
        self.degraded.contains(&domain)
    }

    fn record<T>(&mut self, domain: Domain, result: Result<T>, apply: impl FnOnce(&mut Self, T)) {
        match result {
            Ok(value) => {
                apply(self, value);
                self.degraded.remove(&domain);
            }
            Err(e) => {
                warn!(
                    symbol = %self.symbol,
                    domain = %domain,
                    kind = ?ErrorKind::PartialFetchFailure,
                    error = %e,
                    "detail fetch failed"
                );
                self.degraded.insert(domain);
            }
        }
    }
}

/// Orchestrates the detail page fetches for one symbol at a time
pub struct DetailController {
    source: Arc<dyn StockDataSource>,
    news: Option<Arc<dyn NewsSource>>,
    today: fn() -> NaiveDate,
    state: RwLock<DetailState>,
    navigation: AtomicU64,
    chart_epoch: AtomicU64,
    history_epoch: AtomicU64,
}

impl DetailController {
    pub fn new(source: Arc<dyn StockDataSource>) -> Self {
        Self {
            source,
            news: None,
            today: today_utc,
            state: RwLock::new(DetailState::default()),
            navigation: AtomicU64::new(0),
            chart_epoch: AtomicU64::new(0),
            history_epoch: AtomicU64::new(0),
        }
    }

    /// Attach a news provider; without one the news domain is never fetched
    #[must_use]
    pub fn with_news(mut self, news: Arc<dyn NewsSource>) -> Self {
        self.news = Some(news);
        self
    }

    /// Override the clock used to compute range windows
    #[must_use]
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Copy of the current page state
    pub async fn state(&self) -> DetailState {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> DetailStatus {
        self.state.read().await.status
    }

    /// Navigate to `symbol` and fetch every domain of its detail page.
    ///
    /// The chart range selected for the previous symbol carries over; the
    /// price history range starts again from its default.
    pub async fn load(&self, symbol: &str) -> LoadOutcome {
        // The navigation tag and the symbol change under one write lock
        let (navigation, chart_range) = {
            let mut state = self.state.write().await;
            let navigation = self.navigation.fetch_add(1, Ordering::SeqCst) + 1;
            let chart_range = state.chart_range;
            *state = DetailState::loading(symbol, chart_range);
            (navigation, chart_range)
        };
        info!(symbol, "loading stock detail");

        let identity = match self.source.get_stock(symbol).await {
            Ok(Some(identity)) => identity,
            Ok(None) => return self.finish_not_found(navigation, Domain::Identity).await,
            Err(e) => {
                warn!(symbol, error = %e, "identity fetch failed");
                return self.finish_not_found(navigation, Domain::Identity).await;
            }
        };
        let applied = self
            .apply(navigation, |state| state.identity = Some(identity.clone()))
            .await;
        if !applied {
            return LoadOutcome::Superseded;
        }

        let fundamentals = match self.source.get_stock_info(symbol).await {
            Ok(Some(fundamentals)) => fundamentals,
            Ok(None) => return self.finish_not_found(navigation, Domain::Fundamentals).await,
            Err(e) => {
                warn!(symbol, error = %e, "fundamentals fetch failed");
                return self.finish_not_found(navigation, Domain::Fundamentals).await;
            }
        };
        let company = fundamentals.display_name().map(str::to_owned);
        let applied = self
            .apply(navigation, |state| {
                state.fundamentals = Some(fundamentals);
                state.status = DetailStatus::Loaded;
            })
            .await;
        if !applied {
            return LoadOutcome::Superseded;
        }

        let label = price_chart_label(Some(&identity.name), symbol);
        let statements_symbol = identity.stock_symbol.as_str();
        let _ = tokio::join!(
            self.load_news(navigation, company.as_deref()),
            self.load_latest_price(navigation, symbol),
            self.load_income(navigation, statements_symbol),
            self.load_balance_sheet(navigation, statements_symbol),
            self.load_cash_flow(navigation, statements_symbol),
            self.fetch_price_chart(navigation, symbol, &label, chart_range),
            self.fetch_price_history(navigation, symbol, TimeRange::default()),
        );

        if self.is_current(navigation) {
            let degraded = self.state.read().await.degraded.len();
            info!(symbol, degraded, "stock detail loaded");
            LoadOutcome::Loaded
        } else {
            LoadOutcome::Superseded
        }
    }

    /// Select a new chart range and refetch only the price chart
    pub async fn set_chart_range(&self, range: ChartRange) -> Result<RefreshOutcome> {
        self.state.write().await.chart_range = range;
        self.refresh_price_series(range).await
    }

    /// Refetch the price chart for `range`.
    ///
    /// Only the price chart is replaced. Does nothing until an identity has
    /// loaded for the current symbol.
    pub async fn refresh_price_series(&self, range: ChartRange) -> Result<RefreshOutcome> {
        let (navigation, symbol, label) = {
            let state = self.state.read().await;
            let navigation = self.navigation.load(Ordering::SeqCst);
            let Some(identity) = &state.identity else {
                debug!(range = %range, "no stock loaded, skipping chart refresh");
                return Ok(RefreshOutcome::Skipped);
            };
            (
                navigation,
                state.symbol.clone(),
                price_chart_label(Some(&identity.name), &state.symbol),
            )
        };
        self.fetch_price_chart(navigation, &symbol, &label, range).await
    }

    /// Select a price history range and refetch its raw rows
    pub async fn change_time_range(&self, range: TimeRange) -> Result<RefreshOutcome> {
        let (navigation, symbol) = {
            let mut state = self.state.write().await;
            let navigation = self.navigation.load(Ordering::SeqCst);
            if state.identity.is_none() {
                debug!(range = %range, "no stock loaded, skipping history refresh");
                return Ok(RefreshOutcome::Skipped);
            }
            state.time_range = range;
            (navigation, state.symbol.clone())
        };
        self.fetch_price_history(navigation, &symbol, range).await
    }

    fn is_current(&self, navigation: u64) -> bool {
        self.navigation.load(Ordering::SeqCst) == navigation
    }

    /// Run `update` under the write lock if `navigation` is still current
    async fn apply(&self, navigation: u64, update: impl FnOnce(&mut DetailState)) -> bool {
        let mut state = self.state.write().await;
        if !self.is_current(navigation) {
            debug!(symbol = %state.symbol, "dropping response for a previous navigation");
            return false;
        }
        update(&mut state);
        true
    }

    async fn finish_not_found(&self, navigation: u64, domain: Domain) -> LoadOutcome {
        let applied = self
            .apply(navigation, |state| {
                info!(symbol = %state.symbol, domain = %domain, kind = ?ErrorKind::NotFound, "stock not found");
                state.identity = None;
                state.fundamentals = None;
                state.status = DetailStatus::NotFound;
            })
            .await;
        if applied {
            LoadOutcome::NotFound
        } else {
            LoadOutcome::Superseded
        }
    }

    async fn load_news(&self, navigation: u64, company: Option<&str>) {
        let (Some(news), Some(company)) = (&self.news, company) else {
            debug!("news lookup skipped");
            return;
        };
        let result = news.get_news_about(company).await;
        self.apply(navigation, |state| {
            state.record(Domain::News, result, |s, articles| s.news = Some(articles));
        })
        .await;
    }

    async fn load_latest_price(&self, navigation: u64, symbol: &str) {
        let result = self.source.get_stock_price(symbol).await;
        self.apply(navigation, |state| {
            state.record(Domain::LatestPrice, result, |s, point| {
                s.latest_price = point.close_price;
            });
        })
        .await;
    }

    async fn load_income(&self, navigation: u64, symbol: &str) {
        let result = self.source.get_income_statements(symbol).await;
        self.apply(navigation, |state| {
            state.record(Domain::IncomeStatement, result, |s, rows| {
                s.income = Some(IncomeCharts::from_statements(&rows));
            });
        })
        .await;
    }

    async fn load_balance_sheet(&self, navigation: u64, symbol: &str) {
        let result = self.source.get_balance_sheets(symbol).await;
        self.apply(navigation, |state| {
            state.record(Domain::BalanceSheet, result, |s, rows| {
                s.balance_sheet = Some(BalanceSheetCharts::from_sheets(&rows));
            });
        })
        .await;
    }

    async fn load_cash_flow(&self, navigation: u64, symbol: &str) {
        let result = self.source.get_cash_flows(symbol).await;
        self.apply(navigation, |state| {
            state.record(Domain::CashFlow, result, |s, rows| {
                s.cash_flow = Some(CashFlowCharts::from_statements(&rows));
            });
        })
        .await;
    }

    async fn fetch_price_chart(
        &self,
        navigation: u64,
        symbol: &str,
        label: &str,
        range: ChartRange,
    ) -> Result<RefreshOutcome> {
        let epoch = self.chart_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let window = range.window((self.today)());
        let request = PriceRangeRequest {
            stock_symbol: symbol.to_string(),
            start_date: window.start,
            end_date: window.end,
        };
        let result = self.source.get_price_range(&request).await;

        let mut state = self.state.write().await;
        if !self.is_current(navigation)
            || state.symbol != symbol
            || self.chart_epoch.load(Ordering::SeqCst) != epoch
        {
            debug!(symbol, range = %range, "dropping stale price chart response");
            return Ok(RefreshOutcome::Stale);
        }
        match result {
            Ok(points) => {
                state.price_chart = Some(price_chart(points, label));
                state.chart_range = range;
                state.degraded.remove(&Domain::PriceChart);
                Ok(RefreshOutcome::Applied)
            }
            Err(e) => {
                warn!(symbol, range = %range, error = %e, "price chart fetch failed");
                state.degraded.insert(Domain::PriceChart);
                Err(e)
            }
        }
    }

    async fn fetch_price_history(
        &self,
        navigation: u64,
        symbol: &str,
        range: TimeRange,
    ) -> Result<RefreshOutcome> {
        let epoch = self.history_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let window = range.window((self.today)());
        let request = PriceRangeRequest {
            stock_symbol: symbol.to_string(),
            start_date: window.start,
            end_date: window.end,
        };
        let result = self.source.get_price_range(&request).await;

        let mut state = self.state.write().await;
        if !self.is_current(navigation)
            || state.symbol != symbol
            || self.history_epoch.load(Ordering::SeqCst) != epoch
        {
            debug!(symbol, range = %range, "dropping stale price history response");
            return Ok(RefreshOutcome::Stale);
        }
        match result {
            Ok(points) => {
                state.price_history = Some(points);
                state.time_range = range;
                state.degraded.remove(&Domain::PriceHistory);
                Ok(RefreshOutcome::Applied)
            }
            Err(e) => {
                warn!(symbol, range = %range, error = %e, "price history fetch failed");
                state.degraded.insert(Domain::PriceHistory);
                Err(e)
            }
        }
    }
}

/// Price history rows ordered oldest first, for display
pub fn ordered_history(state: &DetailState) -> Vec<PricePoint> {
    state
        .price_history
        .clone()
        .map(normalize_price_series)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockNewsSource, MockStockDataSource};
    use crate::error::DashboardError;
    use crate::models::{
        BalanceSheet, CashFlow, IncomeStatement, PaginatedStocks, Sector, SectorInfo,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn identity(symbol: &str) -> StockIdentity {
        StockIdentity {
            stock_symbol: symbol.to_string(),
            name: format!("{symbol} Holding"),
            sector_id: 1,
            market_cap: Some(1.0e9),
            last_updated: None,
        }
    }

    fn fundamentals(short_name: &str) -> StockFundamentals {
        StockFundamentals {
            short_name: Some(short_name.to_string()),
            ..StockFundamentals::default()
        }
    }

    fn point(symbol: &str, date: NaiveDate, close: f64) -> PricePoint {
        PricePoint {
            stock_symbol: symbol.to_string(),
            date,
            close_price: Some(close),
        }
    }

    /// In-memory source that answers every domain and can hold back one
    /// price range request until released.
    #[derive(Default)]
    struct FakeSource {
        calls: Mutex<Vec<String>>,
        gate: Mutex<Option<oneshot::Receiver<()>>>,
        gate_start: Mutex<Option<NaiveDate>>,
        identity_gate: Mutex<Option<(String, oneshot::Receiver<()>)>>,
        fail_balance_sheet: bool,
    }

    impl FakeSource {
        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        /// Hold the next price range request starting at `start`
        fn hold(&self, start: NaiveDate) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.gate.lock().unwrap() = Some(rx);
            *self.gate_start.lock().unwrap() = Some(start);
            tx
        }

        /// Hold the identity lookup for `symbol` until released
        fn hold_identity(&self, symbol: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.identity_gate.lock().unwrap() = Some((symbol.to_string(), rx));
            tx
        }
    }

    #[async_trait]
    impl StockDataSource for FakeSource {
        async fn get_stock(&self, symbol: &str) -> Result<Option<StockIdentity>> {
            self.record("get_stock");
            let held = {
                let mut gate = self.identity_gate.lock().unwrap();
                match gate.take() {
                    Some((held, rx)) if held == symbol => Some(rx),
                    other => {
                        *gate = other;
                        None
                    }
                }
            };
            if let Some(rx) = held {
                let _ = rx.await;
            }
            Ok(Some(identity(symbol)))
        }

        async fn get_stock_info(&self, _symbol: &str) -> Result<Option<StockFundamentals>> {
            self.record("get_stock_info");
            Ok(Some(fundamentals("Fake Co")))
        }

        async fn get_stock_price(&self, symbol: &str) -> Result<PricePoint> {
            self.record("get_stock_price");
            Ok(point(symbol, fixed_today(), 42.0))
        }

        async fn get_price_range(&self, request: &PriceRangeRequest) -> Result<Vec<PricePoint>> {
            self.record(format!("get_price_range:{}", request.start_date));
            let held = {
                let start = *self.gate_start.lock().unwrap();
                if start == Some(request.start_date) {
                    self.gate_start.lock().unwrap().take();
                    self.gate.lock().unwrap().take()
                } else {
                    None
                }
            };
            if let Some(rx) = held {
                let _ = rx.await;
            }
            // Newest first, the way the API tends to answer
            let span = (request.end_date - request.start_date).num_days() as f64;
            Ok(vec![
                point(&request.stock_symbol, request.end_date, span),
                point(&request.stock_symbol, request.start_date, 1.0),
            ])
        }

        async fn get_predefined_prices(&self, _symbol: &str) -> Result<Vec<PricePoint>> {
            self.record("get_predefined_prices");
            Ok(Vec::new())
        }

        async fn get_income_statements(&self, symbol: &str) -> Result<Vec<IncomeStatement>> {
            self.record("get_income_statements");
            Ok(vec![IncomeStatement {
                stock_symbol: symbol.to_string(),
                quarter: "2024Q1".to_string(),
                revenue: Some(100.0),
                gross_profit: Some(40.0),
                operating_income: Some(20.0),
                net_profit: Some(10.0),
                eps: Some(0.5),
                operating_margin: Some(0.2),
            }])
        }

        async fn get_balance_sheets(&self, symbol: &str) -> Result<Vec<BalanceSheet>> {
            self.record("get_balance_sheets");
            if self.fail_balance_sheet {
                return Err(DashboardError::Api {
                    status: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(vec![BalanceSheet {
                stock_symbol: symbol.to_string(),
                quarter: "2024Q1".to_string(),
                total_assets: Some(500.0),
                total_liabilities: Some(300.0),
                total_equity: Some(200.0),
                current_assets: Some(150.0),
                current_liabilities: Some(100.0),
            }])
        }

        async fn get_cash_flows(&self, symbol: &str) -> Result<Vec<CashFlow>> {
            self.record("get_cash_flows");
            Ok(vec![CashFlow {
                stock_symbol: symbol.to_string(),
                quarter: "2024Q1".to_string(),
                operating_cash_flow: Some(30.0),
                investing_cash_flow: Some(-10.0),
                financing_cash_flow: Some(-5.0),
                free_cash_flow: Some(20.0),
                capital_expenditures: Some(-10.0),
            }])
        }

        async fn search_stocks(&self, _query: &str) -> Result<Vec<StockIdentity>> {
            Ok(Vec::new())
        }

        async fn get_stocks_with_prices(&self, page: u32, limit: u32) -> Result<PaginatedStocks> {
            Ok(PaginatedStocks {
                data: Vec::new(),
                total: 0,
                page,
                pages: 0,
                limit,
            })
        }

        async fn get_all_sectors(&self) -> Result<Vec<Sector>> {
            Ok(Vec::new())
        }

        async fn get_sector_info(&self, sector_id: i64) -> Result<SectorInfo> {
            Err(DashboardError::Other(format!("no sector {sector_id}")))
        }

        async fn get_sector_of_stock(&self, symbol: &str) -> Result<Sector> {
            Err(DashboardError::Other(format!("no sector for {symbol}")))
        }
    }

    #[tokio::test]
    async fn test_identity_not_found_stops_all_fetches() {
        let mut source = MockStockDataSource::new();
        source.expect_get_stock().times(1).returning(|_| Ok(None));
        source.expect_get_stock_info().never();
        source.expect_get_stock_price().never();
        source.expect_get_price_range().never();
        source.expect_get_income_statements().never();
        source.expect_get_balance_sheets().never();
        source.expect_get_cash_flows().never();
        let mut news = MockNewsSource::new();
        news.expect_get_news_about().never();

        let controller = DetailController::new(Arc::new(source)).with_news(Arc::new(news));
        assert_eq!(controller.load("NOPE").await, LoadOutcome::NotFound);

        let state = controller.state().await;
        assert_eq!(state.status, DetailStatus::NotFound);
        assert!(state.identity.is_none());
        assert!(state.price_chart.is_none());
    }

    #[tokio::test]
    async fn test_missing_fundamentals_is_not_found() {
        let mut source = MockStockDataSource::new();
        source
            .expect_get_stock()
            .returning(|symbol| Ok(Some(identity(symbol))));
        source.expect_get_stock_info().times(1).returning(|_| Ok(None));
        source.expect_get_stock_price().never();
        source.expect_get_price_range().never();

        let controller = DetailController::new(Arc::new(source));
        assert_eq!(controller.load("THYAO").await, LoadOutcome::NotFound);

        let state = controller.state().await;
        assert_eq!(state.status, DetailStatus::NotFound);
        assert!(state.identity.is_none());
    }

    #[tokio::test]
    async fn test_full_load_populates_every_domain() {
        let mut news = MockNewsSource::new();
        news.expect_get_news_about()
            .times(1)
            .returning(|company| {
                assert_eq!(company, "Fake Co");
                Ok(vec![NewsArticle {
                    title: Some("Headline".to_string()),
                    ..NewsArticle::default()
                }])
            });

        let controller = DetailController::new(Arc::new(FakeSource::default()))
            .with_news(Arc::new(news))
            .with_clock(fixed_today);
        assert_eq!(controller.load("THYAO").await, LoadOutcome::Loaded);

        let state = controller.state().await;
        assert_eq!(state.status, DetailStatus::Loaded);
        assert_eq!(state.latest_price, Some(42.0));
        assert_eq!(state.news.as_ref().map(Vec::len), Some(1));
        assert!(state.degraded.is_empty());

        let chart = state.price_chart.as_ref().unwrap();
        assert_eq!(chart.label, "THYAO Holding Stock Price");
        assert_eq!(chart.labels, vec!["2024-05-15", "2024-06-15"]);
        assert_eq!(state.income.as_ref().unwrap().revenue.data, vec![Some(100.0)]);
        assert_eq!(
            state.balance_sheet.as_ref().unwrap().total_assets.data,
            vec![Some(500.0)]
        );
        assert_eq!(
            state.cash_flow.as_ref().unwrap().free_cash_flow.data,
            vec![Some(20.0)]
        );

        // Raw history keeps the API's order; display order is ascending
        let history = state.price_history.as_ref().unwrap();
        assert_eq!(history[0].date, fixed_today());
        assert_eq!(ordered_history(&state)[0].date, history[1].date);
    }

    #[tokio::test]
    async fn test_failed_domain_is_isolated() {
        let source = FakeSource {
            fail_balance_sheet: true,
            ..FakeSource::default()
        };
        let controller = DetailController::new(Arc::new(source)).with_clock(fixed_today);
        assert_eq!(controller.load("THYAO").await, LoadOutcome::Loaded);

        let state = controller.state().await;
        assert!(state.is_degraded(Domain::BalanceSheet));
        assert_eq!(state.degraded.len(), 1);
        assert!(state.balance_sheet.is_none());
        assert!(state.income.is_some());
        assert!(state.cash_flow.is_some());
        assert!(state.price_chart.is_some());
        assert_eq!(state.latest_price, Some(42.0));
    }

    #[tokio::test]
    async fn test_chart_range_change_touches_only_price_chart() {
        let source = Arc::new(FakeSource::default());
        let controller = DetailController::new(source.clone()).with_clock(fixed_today);
        controller.load("THYAO").await;
        let before = controller.state().await;
        let calls_before = source.calls().len();

        let outcome = controller.set_chart_range(ChartRange::OneYear).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Applied);

        let after = controller.state().await;
        assert_eq!(after.chart_range, ChartRange::OneYear);
        assert_ne!(after.price_chart, before.price_chart);
        assert_eq!(
            after.price_chart.as_ref().unwrap().labels,
            vec!["2023-06-15", "2024-06-15"]
        );

        let unchanged = DetailState {
            price_chart: before.price_chart.clone(),
            chart_range: before.chart_range,
            ..after.clone()
        };
        assert_eq!(unchanged, before);
        assert_eq!(
            source.calls()[calls_before..],
            ["get_price_range:2023-06-15".to_string()]
        );
    }

    #[tokio::test]
    async fn test_refresh_before_load_is_skipped() {
        let mut source = MockStockDataSource::new();
        source.expect_get_price_range().never();
        let controller = DetailController::new(Arc::new(source));

        let outcome = controller.refresh_price_series(ChartRange::FiveYears).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Skipped);
        let outcome = controller.change_time_range(TimeRange::All).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_stale_chart_response_is_dropped() {
        let source = Arc::new(FakeSource::default());
        let controller = DetailController::new(source.clone()).with_clock(fixed_today);
        controller.load("THYAO").await;

        // The 5Y request stalls until the 1W request has already landed
        let five_year_start = ChartRange::FiveYears.start_date(fixed_today());
        let release = source.hold(five_year_start);

        let slow = controller.set_chart_range(ChartRange::FiveYears);
        let fast = async {
            let outcome = controller.set_chart_range(ChartRange::OneWeek).await;
            release.send(()).unwrap();
            outcome
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert_eq!(fast.unwrap(), RefreshOutcome::Applied);
        assert_eq!(slow.unwrap(), RefreshOutcome::Stale);

        let state = controller.state().await;
        assert_eq!(state.chart_range, ChartRange::OneWeek);
        assert_eq!(
            state.price_chart.unwrap().labels,
            vec!["2024-06-08", "2024-06-15"]
        );
    }

    #[tokio::test]
    async fn test_stale_history_response_is_dropped() {
        let source = Arc::new(FakeSource::default());
        let controller = DetailController::new(source.clone()).with_clock(fixed_today);
        controller.load("THYAO").await;

        let release = source.hold(TimeRange::HISTORY_START);
        let slow = controller.change_time_range(TimeRange::All);
        let fast = async {
            let outcome = controller.change_time_range(TimeRange::OneWeek).await;
            release.send(()).unwrap();
            outcome
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert_eq!(fast.unwrap(), RefreshOutcome::Applied);
        assert_eq!(slow.unwrap(), RefreshOutcome::Stale);

        let state = controller.state().await;
        assert_eq!(state.time_range, TimeRange::OneWeek);
        let history = state.price_history.as_ref().unwrap();
        assert_eq!(
            history[1].date,
            NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()
        );
    }

    #[tokio::test]
    async fn test_superseded_navigation_is_dropped() {
        let source = Arc::new(FakeSource::default());
        let controller = DetailController::new(source.clone()).with_clock(fixed_today);

        // AAA stalls on its identity while BBB loads from start to finish
        let release = source.hold_identity("AAA");
        let slow = controller.load("AAA");
        let fast = async {
            let outcome = controller.load("BBB").await;
            release.send(()).unwrap();
            outcome
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert_eq!(fast, LoadOutcome::Loaded);
        assert_eq!(slow, LoadOutcome::Superseded);

        let state = controller.state().await;
        assert_eq!(state.symbol, "BBB");
        assert_eq!(state.status, DetailStatus::Loaded);
        assert_eq!(state.identity.unwrap().stock_symbol, "BBB");
        assert_eq!(state.price_chart.unwrap().label, "BBB Holding Stock Price");
    }

    #[tokio::test]
    async fn test_chart_refresh_for_previous_symbol_is_dropped() {
        let source = Arc::new(FakeSource::default());
        let controller = DetailController::new(source.clone()).with_clock(fixed_today);
        controller.load("THYAO").await;

        let release = source.hold(ChartRange::FiveYears.start_date(fixed_today()));
        let slow = controller.set_chart_range(ChartRange::FiveYears);
        let fast = async {
            let outcome = controller.load("GARAN").await;
            release.send(()).unwrap();
            outcome
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert_eq!(fast, LoadOutcome::Loaded);
        assert_eq!(slow.unwrap(), RefreshOutcome::Stale);

        let state = controller.state().await;
        assert_eq!(state.symbol, "GARAN");
        assert_eq!(state.chart_range, ChartRange::FiveYears);
        assert_eq!(state.price_chart.unwrap().label, "GARAN Holding Stock Price");
    }

    #[tokio::test]
    async fn test_time_range_stores_raw_history() {
        let source = Arc::new(FakeSource::default());
        let controller = DetailController::new(source.clone()).with_clock(fixed_today);
        controller.load("THYAO").await;
        let chart_before = controller.state().await.price_chart;

        let outcome = controller.change_time_range(TimeRange::All).await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Applied);

        let state = controller.state().await;
        assert_eq!(state.time_range, TimeRange::All);
        let history = state.price_history.as_ref().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].date, TimeRange::HISTORY_START);
        assert_eq!(state.price_chart, chart_before);
    }

    #[tokio::test]
    async fn test_new_navigation_resets_state() {
        let controller =
            DetailController::new(Arc::new(FakeSource::default())).with_clock(fixed_today);
        controller.load("THYAO").await;
        controller.set_chart_range(ChartRange::YearToDate).await.unwrap();
        controller.change_time_range(TimeRange::SixMonths).await.unwrap();

        controller.load("GARAN").await;
        let state = controller.state().await;
        assert_eq!(state.symbol, "GARAN");
        assert_eq!(state.identity.unwrap().stock_symbol, "GARAN");
        assert_eq!(state.chart_range, ChartRange::YearToDate);
        assert_eq!(state.time_range, TimeRange::OneMonth);
        assert_eq!(
            state.price_chart.unwrap().labels,
            vec!["2024-01-01", "2024-06-15"]
        );
    }
}
