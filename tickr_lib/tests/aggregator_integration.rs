//! End-to-end tests running the real providers against wiremock upstreams.

use std::time::Duration;

use rust_decimal_macros::dec;
use tickr_lib::coin_ids::load_coin_ids;
use tickr_lib::provider::SYNTHETIC_HISTORY_POINTS;
use tickr_lib::{AssetKind, FetchError, QuoteAggregator, Settings};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(server: &MockServer, api_key: Option<&str>) -> Settings {
    Settings {
        min_call_delay: Duration::from_millis(10),
        request_timeout: Duration::from_secs(5),
        coinmarketcap_api_key: api_key.map(str::to_string),
        yahoo_base_url: server.uri(),
        yahoo_cookie_url: format!("{}/", server.uri()),
        coingecko_base_url: server.uri(),
        coinmarketcap_base_url: server.uri(),
        ..Settings::default()
    }
}

fn aggregator(server: &MockServer, api_key: Option<&str>) -> QuoteAggregator {
    QuoteAggregator::from_settings(&settings(server, api_key), load_coin_ids().unwrap()).unwrap()
}

fn chart_body(symbol: &str, closes: &[f64]) -> serde_json::Value {
    serde_json::json!({
        "chart": {
            "result": [{
                "meta": { "symbol": symbol, "currency": "USD" },
                "timestamp": (0..closes.len()).map(|i| 1_717_000_000 + i as i64 * 86_400).collect::<Vec<_>>(),
                "indicators": { "quote": [{
                    "open": closes,
                    "high": closes.iter().map(|c| c + 1.0).collect::<Vec<_>>(),
                    "low": closes.iter().map(|c| c - 1.0).collect::<Vec<_>>(),
                    "close": closes,
                    "volume": closes.iter().map(|_| 1_000.0).collect::<Vec<_>>()
                }]}
            }],
            "error": null
        }
    })
}

async fn mount_coingecko_btc(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/coins/bitcoin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "bitcoin",
            "market_data": {
                "current_price": { "usd": 50000.0 },
                "market_cap": { "usd": 985_000_000_000.0 },
                "total_volume": { "usd": 31_000_000_000.0 }
            }
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/coins/bitcoin/market_chart"))
        .and(query_param("vs_currency", "usd"))
        .and(query_param("days", "365"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "prices": [[1.0, 49000.0], [2.0, 49800.0], [3.0, 50000.0]]
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn fail_coingecko(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/coins/bitcoin"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn btc_quote_from_primary_then_cache() {
    let server = MockServer::start().await;
    mount_coingecko_btc(&server, 1).await;
    let agg = aggregator(&server, None);

    let record = agg.get_quote("btc", AssetKind::Crypto, false).await.unwrap();
    assert_eq!(record.symbol, "BTC");
    assert_eq!(record.kind, AssetKind::Crypto);
    assert_eq!(record.current, dec!(50000));
    assert_eq!(record.change, dec!(1000));
    assert_eq!(record.change_percent, dec!(2.04));
    assert_eq!(record.data, vec![dec!(49000), dec!(49800), dec!(50000)]);

    let cached = agg.get_quote("BTC", AssetKind::Crypto, false).await.unwrap();
    assert_eq!(cached.last_updated, record.last_updated);
    // coin detail and market chart, nothing for the cache hit
    assert_eq!(agg.limiter().granted(), 2);
}

#[tokio::test]
async fn unknown_stock_is_symbol_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ZZZZ"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        })))
        .mount(&server)
        .await;
    let agg = aggregator(&server, None);

    let err = agg.get_quote("ZZZZ", AssetKind::Stock, false).await.unwrap_err();
    assert!(matches!(err, FetchError::SymbolNotFound { provider: "YAHOO", ref symbol } if symbol == "ZZZZ"));
    assert!(agg.cache().is_empty());
}

#[tokio::test]
async fn stock_quote_uses_history_and_intraday() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .and(query_param("range", "1y"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("AAPL", &[180.0, 185.0, 187.5])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .and(query_param("range", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("AAPL", &[190.0])))
        .mount(&server)
        .await;
    let agg = aggregator(&server, None);

    let record = agg.get_quote("AAPL", AssetKind::Stock, false).await.unwrap();
    assert_eq!(record.kind, AssetKind::Stock);
    assert_eq!(record.current, dec!(190));
    assert_eq!(record.prev_close, dec!(187.5));
    assert_eq!(record.change, dec!(2.5));
    assert_eq!(record.high, dec!(188.5));
    assert_eq!(record.low, dec!(179));
    assert_eq!(record.market_cap, "--");
    assert_eq!(record.data.len(), 3);
}

#[tokio::test]
async fn requests_within_one_provider_are_spaced() {
    let server = MockServer::start().await;
    mount_coingecko_btc(&server, 1).await;
    let min_delay = Duration::from_millis(200);
    let settings = Settings {
        min_call_delay: min_delay,
        ..settings(&server, None)
    };
    let agg = QuoteAggregator::from_settings(&settings, load_coin_ids().unwrap()).unwrap();

    let start = std::time::Instant::now();
    agg.get_quote("BTC", AssetKind::Crypto, false).await.unwrap();
    assert_eq!(agg.limiter().granted(), 2);
    assert!(start.elapsed() >= min_delay);
}

#[tokio::test]
async fn unmapped_symbol_skips_keyed_provider_without_charge() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/cryptocurrency/quotes/latest"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let agg = aggregator(&server, Some("secret"));

    agg.get_quote("NOTACOIN", AssetKind::Crypto, false).await.unwrap_err();
    // coingecko, then yahoo's cookie host and 1y chart
    assert_eq!(agg.limiter().granted(), 3);
}

#[tokio::test]
async fn keyed_provider_answers_when_primary_fails() {
    let server = MockServer::start().await;
    fail_coingecko(&server, 503).await;
    Mock::given(method("GET"))
        .and(path("/v1/cryptocurrency/quotes/latest"))
        .and(query_param("id", "1"))
        .and(query_param("convert", "USD"))
        .and(header("X-CMC_PRO_API_KEY", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "1": { "id": 1, "symbol": "BTC", "quote": { "USD": {
                "price": 50000.0,
                "percent_change_24h": 2.0,
                "market_cap": 985_000_000_000.0,
                "volume_24h": 31_000_000_000.0
            }}}}
        })))
        .expect(1)
        .mount(&server)
        .await;
    let agg = aggregator(&server, Some("secret"));

    let record = agg.get_quote("BTC", AssetKind::Crypto, false).await.unwrap();
    assert_eq!(record.change, dec!(1000));
    assert_eq!(record.data.len(), SYNTHETIC_HISTORY_POINTS);
    assert_eq!(agg.limiter().granted(), 2);
}

#[tokio::test]
async fn yahoo_pair_is_last_resort() {
    let server = MockServer::start().await;
    fail_coingecko(&server, 404).await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/BTC-USD"))
        .and(query_param("range", "1y"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("BTC-USD", &[48000.0, 49000.0])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/BTC-USD"))
        .and(query_param("range", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body("BTC-USD", &[50000.0])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/cryptocurrency/quotes/latest"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let agg = aggregator(&server, None);

    let record = agg.get_quote("BTC", AssetKind::Crypto, false).await.unwrap();
    assert_eq!(record.symbol, "BTC");
    assert_eq!(record.kind, AssetKind::Crypto);
    assert_eq!(record.current, dec!(50000));
    assert_eq!(record.prev_close, dec!(49000));
    // coingecko, then yahoo's cookie host and both charts
    assert_eq!(agg.limiter().granted(), 4);
    assert!(agg.cache().get("crypto_BTC").is_some());
}

#[tokio::test]
async fn every_provider_failing_is_no_data_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let agg = aggregator(&server, Some("secret"));

    let err = agg.get_quote("ETH", AssetKind::Crypto, false).await.unwrap_err();
    assert_eq!(err.to_string(), "No data found for crypto symbol ETH");
    assert_eq!(agg.limiter().granted(), 4);
    assert!(agg.cache().is_empty());
}

#[tokio::test]
async fn forced_refresh_reaches_upstream_again() {
    let server = MockServer::start().await;
    mount_coingecko_btc(&server, 2).await;
    let agg = aggregator(&server, None);

    agg.get_quote("BTC", AssetKind::Crypto, false).await.unwrap();
    agg.get_quote("BTC", AssetKind::Crypto, true).await.unwrap();
    assert_eq!(agg.limiter().granted(), 4);
}
