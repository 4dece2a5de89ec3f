//! Error types for dashboard operations

use thiserror::Error;

/// Dashboard specific errors
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The API answered with a non-success status
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        message: String,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed base URL or endpoint
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Unknown date range token
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Charting widget could not be prepared
    #[error("Widget error: {0}")]
    Widget(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// How a failure is handled by the page controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Identity or fundamentals absent; terminal "not found" view
    NotFound,
    /// One secondary detail domain failed; siblings are unaffected
    PartialFetchFailure,
    /// The screener's page fetch failed; the whole table is replaced by a banner
    ListFetchFailure,
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
