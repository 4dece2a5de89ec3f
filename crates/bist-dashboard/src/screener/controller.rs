//! Screener page controller

use crate::api::StockDataSource;
use crate::error::{ErrorKind, Result};
use crate::models::StockSummary;
use crate::screener::columns::{Column, ColumnKey, visible_columns};
use crate::screener::filter::{DEFAULT_FILTERS, FilterCriteria, apply_filters};
use crate::screener::search::SearchState;
use crate::screener::sort::{SortState, sorted_view};
use std::sync::Arc;
use tracing::{error, info};

/// Banner text shown when the page listing cannot be fetched
pub const LIST_FETCH_FAILURE_MESSAGE: &str = "Failed to fetch stock data. Please try again later.";

/// Loading lifecycle of the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenerStatus {
    Loading,
    Ready,
    /// The listing fetch failed; no table is rendered
    Failed(String),
}

/// Holds one page of the listing and the refinements applied to it.
///
/// Filtering, searching and sorting only ever see the rows of the current
/// page; pagination itself is done by the API.
pub struct ScreenerController {
    source: Arc<dyn StockDataSource>,
    items_per_page: u32,
    current_page: u32,
    total_pages: u32,
    total_stocks: u64,
    status: ScreenerStatus,
    working_set: Vec<StockSummary>,
    filtered: Vec<StockSummary>,
    pending_filters: FilterCriteria,
    applied_filters: FilterCriteria,
    filters_open: bool,
    search: SearchState,
    sort: SortState,
}

impl ScreenerController {
    pub fn new(source: Arc<dyn StockDataSource>, items_per_page: u32) -> Self {
        Self {
            source,
            items_per_page,
            current_page: 1,
            total_pages: 1,
            total_stocks: 0,
            status: ScreenerStatus::Loading,
            working_set: Vec::new(),
            filtered: Vec::new(),
            pending_filters: DEFAULT_FILTERS,
            applied_filters: DEFAULT_FILTERS,
            filters_open: false,
            search: SearchState::new(),
            sort: SortState::default(),
        }
    }

    /// Fetch `page` and make it the working set.
    ///
    /// A fresh page resets the filtered rows, the applied criteria and any
    /// active search. The dialog keeps its pending values. On failure the status carries the banner message and the error is
    /// returned.
    pub async fn load_page(&mut self, page: u32) -> Result<()> {
        let page = page.max(1);
        self.status = ScreenerStatus::Loading;

        match self.source.get_stocks_with_prices(page, self.items_per_page).await {
            Ok(listing) => {
                info!(
                    page = listing.page,
                    pages = listing.pages,
                    rows = listing.data.len(),
                    "loaded screener page"
                );
                self.current_page = page;
                self.total_pages = listing.pages.max(1);
                self.total_stocks = listing.total;
                self.filtered = listing.data.clone();
                self.working_set = listing.data;
                self.applied_filters = DEFAULT_FILTERS;
                self.search.reset();
                self.status = ScreenerStatus::Ready;
                Ok(())
            }
            Err(e) => {
                error!(page, kind = ?ErrorKind::ListFetchFailure, error = %e, "error fetching stocks");
                self.working_set.clear();
                self.filtered.clear();
                self.status = ScreenerStatus::Failed(LIST_FETCH_FAILURE_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// Load the following page; `false` when already on the last page
    pub async fn next_page(&mut self) -> Result<bool> {
        if self.current_page >= self.total_pages {
            return Ok(false);
        }
        self.load_page(self.current_page + 1).await?;
        Ok(true)
    }

    /// Load the preceding page; `false` when already on the first page
    pub async fn previous_page(&mut self) -> Result<bool> {
        if self.current_page <= 1 {
            return Ok(false);
        }
        self.load_page(self.current_page - 1).await?;
        Ok(true)
    }

    pub fn open_filters(&mut self) {
        self.filters_open = true;
    }

    /// Close the dialog, keeping edits pending
    pub fn cancel_filters(&mut self) {
        self.filters_open = false;
    }

    pub fn filters_open(&self) -> bool {
        self.filters_open
    }

    /// Criteria being edited in the dialog
    pub fn pending_filters(&self) -> &FilterCriteria {
        &self.pending_filters
    }

    pub fn pending_filters_mut(&mut self) -> &mut FilterCriteria {
        &mut self.pending_filters
    }

    /// Reset the edited criteria; rows change only on the next apply
    pub fn clear_filters(&mut self) {
        self.pending_filters = DEFAULT_FILTERS;
    }

    /// Filter the working set with the pending criteria and close the dialog
    pub fn apply_filters(&mut self) {
        self.applied_filters = self.pending_filters;
        self.filtered = apply_filters(&self.working_set, &self.applied_filters);
        self.filters_open = false;
        info!(
            active = self.applied_filters.active_metrics().count(),
            matched = self.filtered.len(),
            "applied screener filters"
        );
    }

    /// Criteria the current rows were filtered with
    pub fn applied_filters(&self) -> &FilterCriteria {
        &self.applied_filters
    }

    /// Narrow the shown rows by symbol; an empty query restores the pre-search rows
    pub fn search(&mut self, query: &str) {
        self.filtered = self.search.handle(query, &self.filtered);
    }

    pub fn search_query(&self) -> &str {
        self.search.query()
    }

    /// Header click on `column`
    pub fn sort_by(&mut self, column: ColumnKey) {
        self.sort.toggle(column);
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    /// Rows to render, in sort order; empty unless the page loaded
    pub fn rows(&self) -> Vec<&StockSummary> {
        match self.status {
            ScreenerStatus::Ready => sorted_view(&self.filtered, &self.sort),
            _ => Vec::new(),
        }
    }

    /// Filtered rows in working-set order
    pub fn filtered(&self) -> &[StockSummary] {
        &self.filtered
    }

    pub fn working_set(&self) -> &[StockSummary] {
        &self.working_set
    }

    pub fn columns(&self) -> Vec<Column> {
        visible_columns(&self.applied_filters)
    }

    pub fn status(&self) -> &ScreenerStatus {
        &self.status
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn total_stocks(&self) -> u64 {
        self.total_stocks
    }
}

/// Route of the detail page for a clicked row
pub fn detail_route(symbol: &str) -> String {
    format!("/stocks/{symbol}")
}
