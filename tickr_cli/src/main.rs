mod commands;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tickr_lib::coin_ids::{load_coin_ids, load_coin_ids_from};
use tickr_lib::{QuoteAggregator, Settings};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "tickr")]
#[command(about = "Stock and crypto quotes with provider fallback and caching")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// YAML file mapping coin symbols to CoinGecko/CoinMarketCap ids
    #[arg(long, global = true)]
    coin_ids: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a single quote
    Quote(commands::quote::QuoteArgs),
    /// Refresh quotes for several symbols on an interval
    Watch(commands::watch::WatchArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("tickr=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "table" => OutputFormat::Table,
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "md" | "markdown" => OutputFormat::Markdown,
        other => bail!("Unknown output format '{}' (expected table, json, csv, markdown)", other),
    };

    let coin_ids = match &cli.coin_ids {
        Some(path) => load_coin_ids_from(path)?,
        None => load_coin_ids()?,
    };
    let settings = Settings::from_env();
    if settings.coinmarketcap_api_key.is_none() {
        tracing::debug!("COINMARKETCAP_API_KEY not set; CoinMarketCap fallback disabled");
    }
    let aggregator = Arc::new(QuoteAggregator::from_settings(&settings, coin_ids)?);

    match &cli.command {
        Commands::Quote(args) => commands::quote::run(args, &aggregator, &format).await?,
        Commands::Watch(args) => commands::watch::run(args, aggregator, &format).await?,
    }

    Ok(())
}
