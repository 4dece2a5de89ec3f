//! Technical analysis widget
//!
//! The widget renders itself; this module only builds the configuration it is
//! created with and loads its script once per process. [`WidgetLoader`] is
//! idempotent: concurrent callers share a single fetch and every later call
//! returns the already loaded script.

use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Element the widget mounts into
pub const CONTAINER_ID: &str = "technical-analysis-chart";

/// Indicators shown on every chart
pub const STUDIES: [&str; 5] = [
    "MASimple@tv-basicstudies",
    "RSI@tv-basicstudies",
    "MACD@tv-basicstudies",
    "StochasticRSI@tv-basicstudies",
    "VolumeProfil@tv-basicstudies",
];

const DISABLED_FEATURES: [&str; 4] = [
    "use_localstorage_for_settings",
    "header_symbol_search",
    "symbol_search_hot_key",
    "header_compare",
];

const ENABLED_FEATURES: [&str; 5] = [
    "study_templates",
    "create_volume_indicator_by_default",
    "side_toolbar_in_fullscreen_mode",
    "show_chart_property_page",
    "hide_last_na_study_output",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetTheme {
    #[default]
    Light,
    Dark,
}

impl WidgetTheme {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    fn pick(self, light: &'static str, dark: &'static str) -> &'static str {
        match self {
            Self::Light => light,
            Self::Dark => dark,
        }
    }

    pub fn toolbar_background(self) -> &'static str {
        self.pick("#f1f3f6", "#2a2e39")
    }
}

impl fmt::Display for WidgetTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pick("light", "dark"))
    }
}

impl FromStr for WidgetTheme {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(DashboardError::Widget(format!("unknown theme: {other}"))),
        }
    }
}

/// Main series style; serialised as the widget's numeric style code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChartStyle {
    #[default]
    Candlestick,
    Line,
}

impl ChartStyle {
    pub fn code(self) -> u8 {
        match self {
            Self::Candlestick => 1,
            Self::Line => 3,
        }
    }
}

impl Serialize for ChartStyle {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl FromStr for ChartStyle {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "candlestick" | "candles" => Ok(Self::Candlestick),
            "line" => Ok(Self::Line),
            other => Err(DashboardError::Widget(format!("unknown chart style: {other}"))),
        }
    }
}

/// Options the widget is constructed with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetConfig {
    pub autosize: bool,
    pub symbol: String,
    pub interval: &'static str,
    pub timezone: &'static str,
    pub theme: WidgetTheme,
    pub style: ChartStyle,
    pub locale: &'static str,
    pub toolbar_bg: &'static str,
    pub enable_publishing: bool,
    pub allow_symbol_change: bool,
    pub container_id: &'static str,
    pub hide_top_toolbar: bool,
    pub hide_side_toolbar: bool,
    pub withdateranges: bool,
    pub studies: Vec<&'static str>,
    pub disabled_features: Vec<&'static str>,
    pub enabled_features: Vec<&'static str>,
    pub overrides: Value,
    pub loading_screen: Value,
}

impl WidgetConfig {
    /// Daily chart of `symbol` on Borsa Istanbul
    pub fn new(symbol: &str, theme: WidgetTheme, style: ChartStyle) -> Self {
        Self {
            autosize: true,
            symbol: format!("BIST:{}", symbol.trim().to_ascii_uppercase()),
            interval: "D",
            timezone: "Europe/Istanbul",
            theme,
            style,
            locale: "tr",
            toolbar_bg: theme.toolbar_background(),
            enable_publishing: false,
            allow_symbol_change: false,
            container_id: CONTAINER_ID,
            hide_top_toolbar: false,
            hide_side_toolbar: false,
            withdateranges: true,
            studies: STUDIES.to_vec(),
            disabled_features: DISABLED_FEATURES.to_vec(),
            enabled_features: ENABLED_FEATURES.to_vec(),
            overrides: overrides(theme),
            loading_screen: json!({
                "backgroundColor": theme.pick("#ffffff", "#131722"),
                "foregroundColor": theme.pick("#2962FF", "#5d9cf5"),
            }),
        }
    }

    pub fn to_json(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn overrides(theme: WidgetTheme) -> Value {
    json!({
        "mainSeriesProperties.candleStyle.upColor": "#26a69a",
        "mainSeriesProperties.candleStyle.downColor": "#ef5350",
        "mainSeriesProperties.candleStyle.wickUpColor": "#26a69a",
        "mainSeriesProperties.candleStyle.wickDownColor": "#ef5350",
        "mainSeriesProperties.candleStyle.borderUpColor": "#26a69a",
        "mainSeriesProperties.candleStyle.borderDownColor": "#ef5350",
        "scalesProperties.textColor": theme.pick("#555", "#999"),
        "paneProperties.backgroundType": "solid",
        "paneProperties.background": theme.pick("#ffffff", "#131722"),
        "paneProperties.gridProperties.color": theme.pick("#F0F3FA", "#2A2E39"),
        "mainSeriesProperties.showPriceLine": true,
    })
}

/// Tracks the mounted widget and tells when it has to be recreated.
///
/// Any change of symbol, theme or style replaces the whole widget.
#[derive(Debug, Default)]
pub struct WidgetMount {
    current: Option<WidgetConfig>,
}

impl WidgetMount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&WidgetConfig> {
        self.current.as_ref()
    }

    /// Returns the config to mount when it differs from the mounted one
    pub fn update(&mut self, symbol: &str, theme: WidgetTheme, style: ChartStyle) -> Option<&WidgetConfig> {
        let next = WidgetConfig::new(symbol, theme, style);
        if self.current.as_ref() == Some(&next) {
            return None;
        }
        debug!(symbol = %next.symbol, %theme, "recreating widget");
        self.current = Some(next);
        self.current.as_ref()
    }

    pub fn unmount(&mut self) {
        self.current = None;
    }
}

/// Loaded widget script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetScript {
    pub url: String,
    pub source: String,
}

/// Fetches the widget script
#[async_trait]
pub trait ScriptFetcher: Send + Sync {
    async fn fetch(&self) -> Result<WidgetScript>;
}

/// Downloads the script over HTTP
#[derive(Debug, Clone)]
pub struct HttpScriptFetcher {
    client: Client,
    url: String,
}

impl HttpScriptFetcher {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            url: config.widget_script_url.clone(),
        })
    }
}

#[async_trait]
impl ScriptFetcher for HttpScriptFetcher {
    async fn fetch(&self) -> Result<WidgetScript> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Widget(format!(
                "script {} answered {status}",
                self.url
            )));
        }
        Ok(WidgetScript {
            url: self.url.clone(),
            source: response.text().await?,
        })
    }
}

static GLOBAL_LOADER: WidgetLoader = WidgetLoader::new();

/// Once-initialised widget script
///
/// A failed load leaves the loader empty so the next caller retries.
#[derive(Debug)]
pub struct WidgetLoader {
    script: OnceCell<Arc<WidgetScript>>,
}

impl Default for WidgetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetLoader {
    pub const fn new() -> Self {
        Self {
            script: OnceCell::const_new(),
        }
    }

    /// The loader shared by the whole process
    pub fn global() -> &'static Self {
        &GLOBAL_LOADER
    }

    /// Load the script on first use and return it.
    ///
    /// Concurrent callers wait on the same fetch.
    pub async fn acquire(&self, fetcher: &dyn ScriptFetcher) -> Result<Arc<WidgetScript>> {
        let script = self
            .script
            .get_or_try_init(|| async {
                let script = fetcher.fetch().await?;
                info!(url = %script.url, bytes = script.source.len(), "widget script loaded");
                Ok::<_, DashboardError>(Arc::new(script))
            })
            .await?;
        Ok(Arc::clone(script))
    }

    pub fn is_ready(&self) -> bool {
        self.script.initialized()
    }

    pub fn script(&self) -> Option<Arc<WidgetScript>> {
        self.script.get().cloned()
    }
}
