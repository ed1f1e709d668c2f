use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use comfy_table::Table;
use price_engine::config::AppConfig;
use price_engine::engine::Weight;
use price_engine::engine::aggregator::{PriceAggregator, WeightedSource};
use price_engine::engine::calculator::PriceCalculator;
use price_engine::engine::history::PriceHistory;
use price_engine::engine::range::HistoricalRange;
use price_engine::engine::sources::{build_source, coingecko::CoinGeckoSource};
use price_engine::error::Error;
use price_engine::observability;
use price_engine::types::reading::PriceReading;
use price_engine::types::symbol::Symbol;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "price-engine", about = "Fetch and display cryptocurrency prices.")]
struct Cli {
    /// Mode to run in: 'live' or 'historical'.
    #[arg(long, value_enum)]
    mode: Mode,

    /// Start date for historical prices (YYYY-MM-DD). Required for
    /// historical mode.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// End date for historical prices (YYYY-MM-DD). Required for
    /// historical mode.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Symbol to quote; defaults to the configured symbol.
    #[arg(long)]
    symbol: Option<String>,

    /// Extra configuration file layered over the defaults.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Live,
    Historical,
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::tracing::init();
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let symbol = Symbol::new(cli.symbol.clone().unwrap_or_else(|| config.symbol.clone()));

    match cli.mode {
        Mode::Live => run_live(&config, &symbol).await,
        Mode::Historical => {
            let (Some(from), Some(to)) = (cli.from, cli.to) else {
                eprintln!("Error: --from and --to dates are required for historical mode.");
                return Ok(());
            };
            run_historical(&config, &symbol, from, to).await
        }
    }
}

async fn run_live(config: &AppConfig, symbol: &Symbol) -> Result<()> {
    let client = http_client(config)?;
    let history = Arc::new(PriceHistory::new());
    let mut sources = Vec::new();
    for source_config in config.sources.iter().filter(|s| s.enabled) {
        sources.push(WeightedSource {
            adapter: build_source(source_config, &client)?,
            weight: Weight::from_f64(&source_config.name, source_config.weight)?,
        });
    }
    let aggregator = PriceAggregator::new(sources, history);
    let calculator = PriceCalculator::new(config.calculator.clone())?;

    let set = aggregator.get_all_prices(symbol).await;
    println!("Live prices from all sources:");
    for (name, reading) in set.iter() {
        match reading {
            Some(r) => println!("  {name}: {}", r.price),
            None => println!("  {name}: unavailable"),
        }
    }

    let filtered = calculator.filter_outliers(set);
    match calculator.weighted_average(&filtered, &aggregator.weights()) {
        Ok(average) => println!("Weighted average price: {average}"),
        Err(Error::NoData) => {
            println!("No price available: every source failed or was excluded.");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn run_historical(
    config: &AppConfig,
    symbol: &Symbol,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<()> {
    let client = http_client(config)?;
    let history = Arc::new(PriceHistory::new());
    let range = HistoricalRange::new(Box::new(CoinGeckoSource::new(client)), history);

    match range.fetch(symbol, from, to).await {
        Ok(series) if series.is_empty() => {
            println!("No historical prices available for the specified date range.");
        }
        Ok(series) => print_series(&series),
        Err(e @ Error::InvalidDateRange { .. }) => eprintln!("Error: {e}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn print_series(series: &[PriceReading]) {
    let mut table = Table::new();
    table.set_header(vec!["timestamp", "symbol", "source", "price"]);
    for reading in series {
        table.add_row(vec![
            reading.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            reading.symbol.to_string(),
            reading.source.clone(),
            reading.price.to_string(),
        ]);
    }
    println!("Historical prices:");
    println!("{table}");
}

fn http_client(config: &AppConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.http.timeout_ms))
        .build()
        .map_err(Into::into)
}
