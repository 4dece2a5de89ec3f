//! Display formatting for screener cells

use crate::screener::columns::{CellValue, ColumnKey};
use crate::screener::filter::Metric;

/// How a numeric cell is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueFormat {
    /// Billions with one decimal and a `B` suffix
    Billions,
    /// Thousands separators and two decimals
    Price,
    /// Two decimals and a `%` suffix
    Percent,
    /// Two decimals
    Decimal,
}

impl ColumnKey {
    pub fn value_format(self) -> ValueFormat {
        match self {
            ColumnKey::MarketCap => ValueFormat::Billions,
            ColumnKey::CurrentPrice => ValueFormat::Price,
            ColumnKey::Metric(Metric::DayChange) => ValueFormat::Percent,
            _ => ValueFormat::Decimal,
        }
    }
}

/// Placeholder for missing values
pub const MISSING: &str = "N/A";

/// Render a numeric value, `N/A` when absent
pub fn format_number(value: Option<f64>, format: ValueFormat) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return MISSING.to_string();
    };

    match format {
        ValueFormat::Billions => format!("{:.1}B", value / 1e9),
        ValueFormat::Price => group_thousands(&format!("{value:.2}")),
        ValueFormat::Percent => format!("{value:.2}%"),
        ValueFormat::Decimal => format!("{value:.2}"),
    }
}

/// Render any cell of `column`
pub fn format_cell(column: ColumnKey, value: CellValue<'_>) -> String {
    match value {
        CellValue::Text(text) => text.to_string(),
        CellValue::Number(number) => format_number(number, column.value_format()),
    }
}

/// Insert `,` every three digits of the integer part of a formatted number
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(formatted.len() + integer.len() / 3);
    grouped.push_str(sign);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}
