//! Symbol search layered on top of the filtered rows

use crate::models::StockSummary;

/// Query text plus the filtered rows captured when the search started
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    query: String,
    snapshot: Option<Vec<StockSummary>>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    /// Rows captured when the query went from empty to non-empty
    pub fn snapshot(&self) -> Option<&[StockSummary]> {
        self.snapshot.as_deref()
    }

    /// Apply a new query to `current` and return the rows to show.
    ///
    /// The first non-empty query snapshots `current`. Every non-empty query
    /// narrows `current` by case-insensitive symbol substring, so later
    /// keystrokes refine the previous result. An empty query returns the
    /// snapshot verbatim instead of re-running any filter.
    pub fn handle(&mut self, query: &str, current: &[StockSummary]) -> Vec<StockSummary> {
        if query.is_empty() {
            self.query.clear();
            return self.snapshot.take().unwrap_or_else(|| current.to_vec());
        }

        if self.query.is_empty() {
            self.snapshot = Some(current.to_vec());
        }
        self.query = query.to_string();

        let needle = query.to_lowercase();
        current
            .iter()
            .filter(|stock| stock.stock_symbol.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Forget the query and snapshot
    pub fn reset(&mut self) {
        self.query.clear();
        self.snapshot = None;
    }
}
