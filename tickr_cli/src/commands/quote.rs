use anyhow::{Context, Result};
use clap::Args;
use tickr_lib::QuoteAggregator;

use super::asset_kind;
use crate::output::{print_quotes, DisplayQuote, OutputFormat};

#[derive(Args)]
pub struct QuoteArgs {
    /// Ticker or coin symbol (e.g. AAPL, BTC)
    pub symbol: String,

    /// Treat the symbol as a cryptocurrency
    #[arg(long)]
    pub crypto: bool,

    /// Skip the cache and fetch fresh data
    #[arg(long)]
    pub refresh: bool,
}

pub async fn run(args: &QuoteArgs, aggregator: &QuoteAggregator, format: &OutputFormat) -> Result<()> {
    let record = aggregator
        .get_quote(&args.symbol, asset_kind(args.crypto), args.refresh)
        .await
        .with_context(|| format!("Failed to fetch quote for {}", args.symbol))?;

    print_quotes(&[DisplayQuote::live(record)], format)
}
