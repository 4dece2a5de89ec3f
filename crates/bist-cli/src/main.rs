//! Command-line interface for the BIST dashboard
//!
//! # Usage
//!
//! ```bash
//! # First page of the screener, price between 15 and 100, sorted by P/E
//! bist screen --min price=15 --max price=100 --sort trailingPE
//!
//! # Detail page of one stock with a one year price chart
//! bist show THYAO --range 1Y --performance
//!
//! # Widget configuration for a dark line chart
//! bist widget THYAO --theme dark --style line
//! ```

use anyhow::{Context, bail};
use bist_dashboard::config::DEFAULT_API_BASE_URL;
use bist_dashboard::detail::{
    ChartDataset, ChartRange, DetailState, LoadOutcome, TimeRange, ordered_history,
};
use bist_dashboard::screener::{
    ColumnKey, LIST_FETCH_FAILURE_MESSAGE, Metric, PerformancePeriod, Tone, ValueFormat,
    detail_route, format_cell, format_number, percentage_change,
};
use bist_dashboard::widget::{ChartStyle, HttpScriptFetcher, WidgetConfig, WidgetLoader, WidgetTheme};
use bist_dashboard::{
    BistApiClient, DashboardConfig, DetailController, NewsApiClient, ScreenerController,
    StockDataSource,
};
use bist_utils::LogFormat;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bist")]
#[command(about = "Screen and inspect Borsa Istanbul stocks", long_about = None)]
struct Args {
    /// Base path of the stock API
    #[arg(long, global = true, default_value = DEFAULT_API_BASE_URL)]
    base_url: String,

    /// News endpoint queried with `?q=<company>`
    #[arg(long, global = true)]
    news_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogStyle::Pretty)]
    log_format: LogStyle,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogStyle {
    Pretty,
    Json,
}

impl From<LogStyle> for LogFormat {
    fn from(style: LogStyle) -> Self {
        match style {
            LogStyle::Pretty => LogFormat::Pretty,
            LogStyle::Json => LogFormat::Json,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filter, search and sort one page of the listing
    Screen {
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Rows per page
        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Lower bound, e.g. `price=15` (repeatable)
        #[arg(long = "min", value_parser = parse_bound)]
        min: Vec<(Metric, f64)>,

        /// Upper bound, e.g. `debtToEquity=1.5` (repeatable)
        #[arg(long = "max", value_parser = parse_bound)]
        max: Vec<(Metric, f64)>,

        /// Case-insensitive substring of the symbol
        #[arg(long)]
        search: Option<String>,

        /// Column to sort by
        #[arg(long)]
        sort: Option<ColumnKey>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Detail page of one stock
    Show {
        symbol: String,

        /// Price chart range: 1W, 1M, YTD, 1Y or 5Y
        #[arg(long, default_value = "1M")]
        range: ChartRange,

        /// Raw price history range: 1D, 1W, 1M, 3M, 6M, 1Y or ALL
        #[arg(long)]
        history: Option<TimeRange>,

        /// Also print period performance from the predefined history
        #[arg(long)]
        performance: bool,
    },

    /// Print the technical analysis widget configuration
    Widget {
        symbol: String,

        #[arg(long, default_value = "light")]
        theme: WidgetTheme,

        #[arg(long, default_value = "candlestick")]
        style: ChartStyle,

        /// Load the widget script before printing
        #[arg(long)]
        load_script: bool,
    },

    /// List sectors, or show one sector's aggregate
    Sectors {
        #[arg(long)]
        id: Option<i64>,
    },
}

fn parse_bound(raw: &str) -> Result<(Metric, f64), String> {
    let (metric, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected METRIC=VALUE, got `{raw}`"))?;
    let metric = metric.parse::<Metric>().map_err(|e| e.to_string())?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid bound `{value}`: {e}"))?;
    Ok((metric, value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    bist_utils::init_tracing_with("warn,bist_dashboard=info", args.log_format.into());

    let mut builder = DashboardConfig::builder()
        .api_base_url(args.base_url.clone())
        .request_timeout(Duration::from_secs(args.timeout));
    if let Some(news_url) = &args.news_url {
        builder = builder.news_api_url(news_url.clone());
    }
    if let Command::Screen { limit, .. } = &args.command {
        builder = builder.items_per_page(*limit);
    }
    let config = builder.build().context("invalid configuration")?;
    info!(base_url = %config.api_base(), "starting bist");

    let source: Arc<dyn StockDataSource> = Arc::new(BistApiClient::new(&config)?);

    match args.command {
        Command::Screen {
            page,
            min,
            max,
            search,
            sort,
            desc,
            ..
        } => run_screen(source, &config, page, &min, &max, search.as_deref(), sort, desc).await,
        Command::Show {
            symbol,
            range,
            history,
            performance,
        } => run_show(source, &config, &symbol, range, history, performance).await,
        Command::Widget {
            symbol,
            theme,
            style,
            load_script,
        } => run_widget(&config, &symbol, theme, style, load_script).await,
        Command::Sectors { id } => run_sectors(source.as_ref(), id).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_screen(
    source: Arc<dyn StockDataSource>,
    config: &DashboardConfig,
    page: u32,
    min: &[(Metric, f64)],
    max: &[(Metric, f64)],
    search: Option<&str>,
    sort: Option<ColumnKey>,
    desc: bool,
) -> anyhow::Result<()> {
    let mut screener = ScreenerController::new(source, config.items_per_page);
    if screener.load_page(page).await.is_err() {
        bail!(LIST_FETCH_FAILURE_MESSAGE);
    }

    if !min.is_empty() || !max.is_empty() {
        screener.open_filters();
        let pending = screener.pending_filters_mut();
        for &(metric, value) in min {
            pending.set_min(metric, Some(value));
        }
        for &(metric, value) in max {
            pending.set_max(metric, Some(value));
        }
        screener.apply_filters();
    }

    if let Some(query) = search {
        screener.search(query);
    }

    // The first click on a column sorts ascending, the second descending
    if let Some(column) = sort {
        screener.sort_by(column);
        if desc {
            screener.sort_by(column);
        }
    }

    let columns = screener.columns();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(columns.iter().map(|c| c.label).chain(["Route"]));
    for stock in screener.rows() {
        let mut row: Vec<Cell> = columns
            .iter()
            .map(|c| Cell::new(format_cell(c.key, c.key.value(stock))))
            .collect();
        row.push(Cell::new(detail_route(&stock.stock_symbol)));
        table.add_row(row);
    }

    println!("{table}");
    println!(
        "Page {} of {} ({} stocks, {} shown)",
        screener.current_page(),
        screener.total_pages(),
        screener.total_stocks(),
        screener.rows().len()
    );
    Ok(())
}

async fn run_show(
    source: Arc<dyn StockDataSource>,
    config: &DashboardConfig,
    symbol: &str,
    range: ChartRange,
    history: Option<TimeRange>,
    performance: bool,
) -> anyhow::Result<()> {
    let symbol = symbol.trim().to_ascii_uppercase();
    let mut detail = DetailController::new(Arc::clone(&source));
    if let Some(news) = NewsApiClient::from_config(config)? {
        detail = detail.with_news(Arc::new(news));
    }

    match detail.load(&symbol).await {
        LoadOutcome::Loaded => {}
        LoadOutcome::NotFound => bail!("Stock not found: {symbol}"),
        LoadOutcome::Superseded => bail!("navigation to {symbol} was superseded"),
    }

    if range != ChartRange::default() {
        detail.set_chart_range(range).await?;
    }
    if let Some(history) = history {
        detail.change_time_range(history).await?;
    }

    let state = detail.state().await;
    print_overview(&state);

    if let Some(chart) = &state.price_chart {
        print_price_chart(chart, state.chart_range);
    }
    if history.is_some() {
        let rows = ordered_history(&state);
        println!(
            "Price history {}: {} rows, last close {}",
            state.time_range,
            rows.len(),
            format_number(rows.last().and_then(|p| p.close_price), ValueFormat::Price)
        );
    }
    if let Some(income) = &state.income {
        print_datasets("Income statement", &income.datasets());
    }
    if let Some(balance) = &state.balance_sheet {
        print_datasets("Balance sheet", &balance.datasets());
    }
    if let Some(cash_flow) = &state.cash_flow {
        print_datasets("Cash flow", &cash_flow.datasets());
    }
    if let Some(news) = &state.news {
        for article in news.iter().take(5) {
            println!(
                "- {} {}",
                article.title.as_deref().unwrap_or("(untitled)"),
                article.url.as_deref().unwrap_or_default()
            );
        }
    }
    for domain in &state.degraded {
        eprintln!("warning: {domain} could not be loaded");
    }

    if performance {
        let prices = source.get_predefined_prices(&symbol).await?;
        print_performance(&prices);
    }
    Ok(())
}

fn print_overview(state: &DetailState) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    if let Some(identity) = &state.identity {
        table.add_row(vec![Cell::new("Symbol"), Cell::new(&identity.stock_symbol)]);
        table.add_row(vec![Cell::new("Name"), Cell::new(&identity.name)]);
        table.add_row(vec![
            Cell::new("Market Cap"),
            Cell::new(format_number(identity.market_cap, ValueFormat::Billions)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Latest Close"),
        Cell::new(format_number(state.latest_price, ValueFormat::Price)),
    ]);
    if let Some(info) = &state.fundamentals {
        let ratios = [
            ("P/E", info.trailing_pe),
            ("P/B", info.price_to_book),
            ("EV/EBITDA", info.enterprise_to_ebitda),
            ("Profit Margin", info.profit_margins),
            ("Debt to Equity", info.debt_to_equity),
            ("Current Ratio", info.current_ratio),
        ];
        for (label, value) in ratios {
            table.add_row(vec![
                Cell::new(label),
                Cell::new(format_number(value, ValueFormat::Decimal)),
            ]);
        }
    }
    println!("{table}");
}

fn print_price_chart(chart: &ChartDataset, range: ChartRange) {
    let first = chart.points().next();
    let last = chart.points().last();
    match (first, last) {
        (Some((start, open)), Some((end, close))) => println!(
            "{} [{range}]: {} points, {start} {} -> {end} {}",
            chart.label,
            chart.len(),
            format_number(open, ValueFormat::Price),
            format_number(close, ValueFormat::Price)
        ),
        _ => println!("{} [{range}]: no data", chart.label),
    }
}

fn print_datasets(title: &str, datasets: &[&ChartDataset]) {
    let Some(first) = datasets.first() else {
        return;
    };
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(std::iter::once(title.to_string()).chain(first.labels.iter().cloned()));
    for dataset in datasets {
        let mut row = vec![Cell::new(&dataset.label)];
        row.extend(
            dataset
                .data
                .iter()
                .map(|v| Cell::new(format_number(*v, ValueFormat::Decimal))),
        );
        table.add_row(row);
    }
    println!("{table}");
}

fn print_performance(prices: &[bist_dashboard::models::PricePoint]) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(PerformancePeriod::ALL.iter().map(|p| p.label()));
    let row: Vec<Cell> = PerformancePeriod::ALL
        .iter()
        .map(|&period| {
            let change = percentage_change(prices, period);
            let cell = Cell::new(format_number(change, ValueFormat::Percent));
            match Tone::for_change(change) {
                Tone::Positive => cell.fg(Color::Green),
                Tone::Negative => cell.fg(Color::Red),
                Tone::Neutral => cell,
            }
        })
        .collect();
    table.add_row(row);
    println!("{table}");
}

async fn run_widget(
    config: &DashboardConfig,
    symbol: &str,
    theme: WidgetTheme,
    style: ChartStyle,
    load_script: bool,
) -> anyhow::Result<()> {
    if load_script {
        let fetcher = HttpScriptFetcher::new(config)?;
        let script = WidgetLoader::global().acquire(&fetcher).await?;
        eprintln!("loaded {} ({} bytes)", script.url, script.source.len());
    }

    let widget = WidgetConfig::new(symbol, theme, style);
    println!("{}", serde_json::to_string_pretty(&widget.to_json()?)?);
    Ok(())
}

async fn run_sectors(source: &dyn StockDataSource, id: Option<i64>) -> anyhow::Result<()> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);

    if let Some(id) = id {
        let info = source.get_sector_info(id).await?;
        println!(
            "{} ({} companies, total cap {})",
            info.sector.name,
            info.number_of_companies,
            format_number(info.total_market_cap, ValueFormat::Billions)
        );
        table.set_header(vec!["Symbol", "Name", "Market Cap"]);
        for company in &info.top_3_companies {
            table.add_row(vec![
                Cell::new(&company.stock_symbol),
                Cell::new(&company.name),
                Cell::new(format_number(company.market_cap, ValueFormat::Billions)),
            ]);
        }
    } else {
        table.set_header(vec!["Id", "Sector"]);
        for sector in source.get_all_sectors().await? {
            table.add_row(vec![Cell::new(sector.sector_id), Cell::new(sector.name)]);
        }
    }

    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bound() {
        assert_eq!(parse_bound("price=15").unwrap(), (Metric::Price, 15.0));
        assert_eq!(
            parse_bound("debtToEquity= 1.5").unwrap(),
            (Metric::DebtToEquity, 1.5)
        );
        assert!(parse_bound("price").is_err());
        assert!(parse_bound("price=abc").is_err());
        assert!(parse_bound("nope=1").is_err());
    }

    #[test]
    fn test_cli_parses_screen() {
        let args = Args::try_parse_from([
            "bist", "screen", "--min", "price=15", "--sort", "marketcap", "--desc",
        ])
        .unwrap();
        match args.command {
            Command::Screen { min, sort, desc, .. } => {
                assert_eq!(min, vec![(Metric::Price, 15.0)]);
                assert_eq!(sort, Some(ColumnKey::MarketCap));
                assert!(desc);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_range() {
        assert!(Args::try_parse_from(["bist", "show", "THYAO", "--range", "3M"]).is_err());
        assert!(Args::try_parse_from(["bist", "show", "THYAO", "--history", "3M"]).is_ok());
    }
}
