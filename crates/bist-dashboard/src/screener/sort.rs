//! Single-column sort of screener rows

use crate::models::StockSummary;
use crate::screener::columns::{CellValue, ColumnKey};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: ColumnKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    /// Highest price first
    fn default() -> Self {
        Self {
            column: ColumnKey::CurrentPrice,
            direction: SortDirection::Descending,
        }
    }
}

impl SortState {
    pub fn new(column: ColumnKey, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Header click: the active column sorted ascending flips to descending,
    /// anything else becomes ascending on `column`.
    pub fn toggle(&mut self, column: ColumnKey) {
        let was_ascending = self.column == column && self.direction == SortDirection::Ascending;
        self.column = column;
        self.direction = if was_ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
    }
}

/// Ascending order of two cells; missing numbers sort before present ones
fn compare_cells(a: CellValue<'_>, b: CellValue<'_>) -> Ordering {
    match (a, b) {
        (CellValue::Text(a), CellValue::Text(b)) => a.cmp(b),
        (CellValue::Number(a), CellValue::Number(b)) => match (a, b) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
        },
        // a column never mixes kinds
        _ => Ordering::Equal,
    }
}

/// Rows ordered by `state`, leaving `stocks` untouched. Equal keys keep input order.
pub fn sorted_view<'a>(stocks: &'a [StockSummary], state: &SortState) -> Vec<&'a StockSummary> {
    let mut rows: Vec<&StockSummary> = stocks.iter().collect();
    rows.sort_by(|a, b| {
        let ordering = compare_cells(state.column.value(a), state.column.value(b));
        match state.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    rows
}
