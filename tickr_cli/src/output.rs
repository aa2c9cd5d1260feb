use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tickr_lib::QuoteRecord;

/// Placeholder for values a provider did not supply.
const ABSENT: &str = "--";

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

/// A record plus whether it is a leftover from an earlier refresh.
#[derive(Clone, Debug, Serialize)]
pub struct DisplayQuote {
    #[serde(flatten)]
    pub record: QuoteRecord,
    pub stale: bool,
}

impl DisplayQuote {
    pub fn live(record: QuoteRecord) -> Self {
        Self {
            record,
            stale: false,
        }
    }

    pub fn stale(record: QuoteRecord) -> Self {
        Self {
            record,
            stale: true,
        }
    }
}

#[derive(Tabled, Serialize)]
struct QuoteRow {
    #[tabled(rename = "Symbol")]
    #[serde(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Type")]
    #[serde(rename = "Type")]
    kind: String,
    #[tabled(rename = "Price")]
    #[serde(rename = "Price")]
    current: String,
    #[tabled(rename = "Change")]
    #[serde(rename = "Change")]
    change: String,
    #[tabled(rename = "Open")]
    #[serde(rename = "Open")]
    open: String,
    #[tabled(rename = "Prev Close")]
    #[serde(rename = "Prev Close")]
    prev_close: String,
    #[tabled(rename = "High")]
    #[serde(rename = "High")]
    high: String,
    #[tabled(rename = "Low")]
    #[serde(rename = "Low")]
    low: String,
    #[tabled(rename = "P/E")]
    #[serde(rename = "P/E")]
    pe_ratio: String,
    #[tabled(rename = "Market Cap")]
    #[serde(rename = "Market Cap")]
    market_cap: String,
    #[tabled(rename = "Volume")]
    #[serde(rename = "Volume")]
    volume: String,
    #[tabled(rename = "Avg Volume")]
    #[serde(rename = "Avg Volume")]
    avg_volume: String,
    #[tabled(rename = "Bid")]
    #[serde(rename = "Bid")]
    bid: String,
    #[tabled(rename = "Ask")]
    #[serde(rename = "Ask")]
    ask: String,
    #[tabled(rename = "Points")]
    #[serde(rename = "Points")]
    points: usize,
    #[tabled(rename = "First")]
    #[serde(rename = "First")]
    first: String,
    #[tabled(rename = "Last")]
    #[serde(rename = "Last")]
    last: String,
    #[tabled(rename = "Updated")]
    #[serde(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Status")]
    #[serde(rename = "Status")]
    status: String,
}

fn build_quote_rows(quotes: &[DisplayQuote]) -> Vec<QuoteRow> {
    quotes
        .iter()
        .map(|q| {
            let r = &q.record;
            QuoteRow {
                symbol: r.symbol.clone(),
                kind: r.kind.to_string(),
                current: format_price(r.current),
                change: format_change(r.change, r.change_percent),
                open: format_price(r.open),
                prev_close: format_price(r.prev_close),
                high: format_price(r.high),
                low: format_price(r.low),
                pe_ratio: r.pe_ratio.map(format_price).unwrap_or_else(|| ABSENT.to_string()),
                market_cap: r.market_cap.clone(),
                volume: format_count(r.volume),
                avg_volume: format_count(r.avg_volume),
                bid: format_price(r.bid),
                ask: format_price(r.ask),
                points: r.data.len(),
                first: r.data.first().copied().map(format_price).unwrap_or_else(|| ABSENT.to_string()),
                last: r.data.last().copied().map(format_price).unwrap_or_else(|| ABSENT.to_string()),
                updated: r.last_updated.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
                status: if q.stale { "stale" } else { "live" }.to_string(),
            }
        })
        .collect()
}

/// Renders `quotes` in the requested format.
pub fn print_quotes(quotes: &[DisplayQuote], format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_quotes_table(quotes),
        OutputFormat::Json => print_json(&quotes),
        OutputFormat::Csv => print_quotes_csv(quotes)?,
        OutputFormat::Markdown => print_quotes_markdown(quotes),
    }
    Ok(())
}

// -- Table output --

pub fn print_quotes_table(quotes: &[DisplayQuote]) {
    println!("{}", Table::new(build_quote_rows(quotes)));
}

// -- Markdown output --

pub fn print_quotes_markdown(quotes: &[DisplayQuote]) {
    let mut table = Table::new(build_quote_rows(quotes));
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

pub fn print_quotes_csv(quotes: &[DisplayQuote]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_quote_rows(quotes) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

/// Two decimal places with thousands separators, e.g. `1,234.50`.
fn format_price(value: Decimal) -> String {
    let value = cents(value);
    let text = format!("{:.2}", value.abs());
    let (int_part, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if value < Decimal::ZERO { "-" } else { "" };
    format!("{}{}.{}", sign, group_thousands(int_part), frac)
}

/// Signed change with percent, e.g. `+1,000.00 (+2.04%)`.
fn format_change(change: Decimal, percent: Decimal) -> String {
    let change = cents(change);
    let percent = cents(percent);
    let sign = if change < Decimal::ZERO { "" } else { "+" };
    let pct_sign = if percent < Decimal::ZERO { "" } else { "+" };
    format!(
        "{}{} ({}{:.2}%)",
        sign,
        format_price(change),
        pct_sign,
        percent
    )
}

/// Rounds to two places. Anything that rounds to zero becomes a plain zero
/// so it never prints with a minus sign.
fn cents(value: Decimal) -> Decimal {
    let rounded = value.round_dp(2);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

fn format_count(value: Option<u64>) -> String {
    match value {
        Some(v) => group_thousands(&v.to_string()),
        None => ABSENT.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tickr_lib::AssetKind;

    pub(crate) fn sample_record(symbol: &str) -> QuoteRecord {
        QuoteRecord {
            symbol: symbol.to_string(),
            current: dec!(50000),
            open: dec!(50010),
            prev_close: dec!(49000),
            high: dec!(51200),
            low: dec!(48750),
            change: dec!(1000),
            change_percent: dec!(2.04),
            pe_ratio: None,
            market_cap: "985.00B".to_string(),
            volume: Some(31_000_000_000),
            avg_volume: None,
            bid: dec!(49950),
            ask: dec!(50050),
            data: vec![dec!(49000), dec!(49500), dec!(50000)],
            kind: AssetKind::Crypto,
            last_updated: Utc::now(),
        }
    }

    #[test]
    fn test_format_price_groups_thousands() {
        assert_eq!(format_price(dec!(1234567.891)), "1,234,567.89");
        assert_eq!(format_price(dec!(999)), "999.00");
        assert_eq!(format_price(dec!(0)), "0.00");
    }

    #[test]
    fn test_format_price_negative() {
        assert_eq!(format_price(dec!(-1500.5)), "-1,500.50");
        assert_eq!(format_price(dec!(-0.5)), "-0.50");
    }

    #[test]
    fn test_values_rounding_to_zero_are_unsigned() {
        assert_eq!(format_price(dec!(-0.001)), "0.00");
        assert_eq!(format_price(dec!(-0.004)), "0.00");
        assert_eq!(format_change(dec!(-0.001), dec!(0)), "+0.00 (+0.00%)");
        assert_eq!(format_change(dec!(0.5), dec!(-0.001)), "+0.50 (+0.00%)");
    }

    #[test]
    fn test_format_change_signs() {
        assert_eq!(format_change(dec!(1000), dec!(2.04)), "+1,000.00 (+2.04%)");
        assert_eq!(format_change(dec!(-25), dec!(-20)), "-25.00 (-20.00%)");
        assert_eq!(format_change(dec!(0), dec!(0)), "+0.00 (+0.00%)");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(Some(31_000_000_000)), "31,000,000,000");
        assert_eq!(format_count(Some(12)), "12");
        assert_eq!(format_count(None), "--");
    }

    #[test]
    fn test_build_quote_rows_mapping() {
        let rows = build_quote_rows(&[DisplayQuote::live(sample_record("BTC"))]);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.symbol, "BTC");
        assert_eq!(row.kind, "crypto");
        assert_eq!(row.current, "50,000.00");
        assert_eq!(row.change, "+1,000.00 (+2.04%)");
        assert_eq!(row.pe_ratio, "--");
        assert_eq!(row.avg_volume, "--");
        assert_eq!(row.points, 3);
        assert_eq!(row.first, "49,000.00");
        assert_eq!(row.last, "50,000.00");
        assert_eq!(row.status, "live");
    }

    #[test]
    fn test_build_quote_rows_stale() {
        let rows = build_quote_rows(&[DisplayQuote::stale(sample_record("ETH"))]);
        assert_eq!(rows[0].status, "stale");
    }

    #[test]
    fn test_build_quote_rows_empty() {
        assert!(build_quote_rows(&[]).is_empty());
    }

    #[test]
    fn test_display_quote_json_flattens_record() {
        let json = serde_json::to_value(DisplayQuote::stale(sample_record("BTC"))).unwrap();
        assert_eq!(json["symbol"], "BTC");
        assert_eq!(json["type"], "crypto");
        assert_eq!(json["stale"], true);
    }

    #[test]
    fn test_csv_headers_use_display_names() {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in build_quote_rows(&[DisplayQuote::live(sample_record("BTC"))]) {
            wtr.serialize(row).unwrap();
        }
        let out = String::from_utf8(wtr.into_inner().ok().unwrap()).unwrap();
        let header = out.lines().next().unwrap();
        assert!(header.starts_with("Symbol,Type,Price,Change"));
        assert!(header.ends_with("Updated,Status"));
    }
}
