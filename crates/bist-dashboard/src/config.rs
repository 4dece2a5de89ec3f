//! Configuration for the dashboard client and controllers

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default location of the stock API
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8001/api/stocks";

/// Default location of the charting widget script
pub const DEFAULT_WIDGET_SCRIPT_URL: &str = "https://s3.tradingview.com/tv.js";

/// Configuration for dashboard operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Base path of the stock API, e.g. `http://host:8001/api/stocks`
    pub api_base_url: String,

    /// News lookup endpoint; news is skipped when unset
    pub news_api_url: Option<String>,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Screener page size sent to the paginated listing
    pub items_per_page: u32,

    /// Script loaded once before any chart widget is created
    pub widget_script_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            news_api_url: None,
            request_timeout: Duration::from_secs(30),
            items_per_page: 10,
            widget_script_url: DEFAULT_WIDGET_SCRIPT_URL.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api_base_url)?;
        Url::parse(&self.widget_script_url)?;
        if let Some(ref news) = self.news_api_url {
            Url::parse(news)?;
        }

        if self.items_per_page == 0 {
            return Err(DashboardError::ConfigError(
                "items_per_page must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(DashboardError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// API base without a trailing slash
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }
}

/// Builder for DashboardConfig
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    api_base_url: Option<String>,
    news_api_url: Option<String>,
    request_timeout: Option<Duration>,
    items_per_page: Option<u32>,
    widget_script_url: Option<String>,
}

impl DashboardConfigBuilder {
    /// Set the API base URL
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Set the news lookup endpoint
    pub fn news_api_url(mut self, url: impl Into<String>) -> Self {
        self.news_api_url = Some(url.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the screener page size
    pub fn items_per_page(mut self, items: u32) -> Self {
        self.items_per_page = Some(items);
        self
    }

    /// Set the widget script URL
    pub fn widget_script_url(mut self, url: impl Into<String>) -> Self {
        self.widget_script_url = Some(url.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DashboardConfig> {
        let defaults = DashboardConfig::default();

        let config = DashboardConfig {
            api_base_url: self.api_base_url.unwrap_or(defaults.api_base_url),
            news_api_url: self.news_api_url.or(defaults.news_api_url),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            items_per_page: self.items_per_page.unwrap_or(defaults.items_per_page),
            widget_script_url: self.widget_script_url.unwrap_or(defaults.widget_script_url),
        };

        config.validate()?;
        Ok(config)
    }
}
