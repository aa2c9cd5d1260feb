//! Periodic refresh of several symbols.
//!
//! Every tick force-refreshes all symbols concurrently. The aggregator's
//! shared rate limiter spaces the outbound calls, so the tasks only overlap
//! while waiting. A symbol whose refresh fails keeps showing its last known
//! record, flagged stale.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use tickr_lib::{AssetKind, FetchError, QuoteAggregator, QuoteRecord};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use super::asset_kind;
use crate::output::{print_quotes, DisplayQuote, OutputFormat};

#[derive(Args)]
pub struct WatchArgs {
    /// Symbols to watch (e.g. AAPL MSFT, or BTC ETH with --crypto)
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Treat the symbols as cryptocurrencies
    #[arg(long)]
    pub crypto: bool,

    /// Seconds between refreshes
    #[arg(long, default_value = "10")]
    pub interval: u64,

    /// Stop after this many refreshes (default: run until Ctrl-C)
    #[arg(long)]
    pub iterations: Option<u64>,
}

type RefreshResult = (String, Result<QuoteRecord, FetchError>);

pub async fn run(
    args: &WatchArgs,
    aggregator: Arc<QuoteAggregator>,
    format: &OutputFormat,
) -> Result<()> {
    if args.interval == 0 {
        bail!("--interval must be at least 1 second");
    }

    tokio::select! {
        res = watch_loop(args, aggregator, format) => res,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted, stopping watch");
            Ok(())
        }
    }
}

async fn watch_loop(
    args: &WatchArgs,
    aggregator: Arc<QuoteAggregator>,
    format: &OutputFormat,
) -> Result<()> {
    let kind = asset_kind(args.crypto);
    let mut last_known: HashMap<String, QuoteRecord> = HashMap::new();
    let mut ticker = tokio::time::interval(Duration::from_secs(args.interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut completed = 0u64;

    loop {
        ticker.tick().await;

        let results = refresh_all(&aggregator, &args.symbols, kind).await;
        let quotes = merge_results(&mut last_known, results);
        if !quotes.is_empty() {
            print_quotes(&quotes, format)?;
        }

        completed += 1;
        if args.iterations.is_some_and(|n| completed >= n) {
            return Ok(());
        }
    }
}

/// Force-refreshes every symbol concurrently and returns the results in
/// the order the symbols were given.
async fn refresh_all(
    aggregator: &Arc<QuoteAggregator>,
    symbols: &[String],
    kind: AssetKind,
) -> Vec<RefreshResult> {
    let mut join_set = JoinSet::new();
    for (idx, symbol) in symbols.iter().enumerate() {
        let aggregator = Arc::clone(aggregator);
        let symbol = symbol.clone();
        join_set.spawn(async move {
            let result = aggregator.get_quote(&symbol, kind, true).await;
            (idx, symbol, result)
        });
    }

    let mut results = Vec::with_capacity(symbols.len());
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => tracing::warn!("Refresh task failed: {}", e),
        }
    }
    results.sort_by_key(|(idx, _, _)| *idx);
    results
        .into_iter()
        .map(|(_, symbol, result)| (symbol, result))
        .collect()
}

/// Folds fresh results into `last_known` and picks what to show: the new
/// record, the previous one marked stale, or nothing if there never was one.
fn merge_results(
    last_known: &mut HashMap<String, QuoteRecord>,
    results: Vec<RefreshResult>,
) -> Vec<DisplayQuote> {
    let mut quotes = Vec::with_capacity(results.len());
    for (symbol, result) in results {
        let key = symbol.trim().to_uppercase();
        match result {
            Ok(record) => {
                last_known.insert(key, record.clone());
                quotes.push(DisplayQuote::live(record));
            }
            Err(e) => match last_known.get(&key) {
                Some(previous) => {
                    eprintln!("{}: {} (showing last known data)", key, e);
                    quotes.push(DisplayQuote::stale(previous.clone()));
                }
                None => eprintln!("{}: {} (no data yet)", key, e),
            },
        }
    }
    quotes
}
