// ═══════════════════════════════════════════════════════════════════
// Provider Tests — CoinGecko payload decoding
// ═══════════════════════════════════════════════════════════════════

use market_tracker_core::errors::CoreError;
use market_tracker_core::providers::coingecko::{parse_markets, CoinGeckoProvider};
use market_tracker_core::providers::traits::MarketDataProvider;

/// A realistic two-record `/coins/markets` payload.
const MARKETS_PAYLOAD: &str = r#"[
  {
    "id": "bitcoin",
    "symbol": "btc",
    "name": "Bitcoin",
    "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
    "current_price": 64250.12,
    "market_cap": 1265432100000,
    "total_volume": 35123456789,
    "price_change_percentage_24h": 2.41,
    "sparkline_in_7d": { "price": [63000.0, 63500.5, 64250.12] }
  },
  {
    "id": "ethereum",
    "symbol": "eth",
    "name": "Ethereum",
    "image": "https://assets.coingecko.com/coins/images/279/large/ethereum.png",
    "current_price": 3150.77,
    "market_cap": 378000000000,
    "total_volume": 18234567890,
    "price_change_percentage_24h": -0.83,
    "sparkline_in_7d": null
  }
]"#;

#[test]
fn parses_markets_payload() {
    let quotes = parse_markets(MARKETS_PAYLOAD).unwrap();
    assert_eq!(quotes.len(), 2);

    let btc = &quotes[0];
    assert_eq!(btc.id, "bitcoin");
    assert_eq!(btc.symbol, "btc");
    assert_eq!(btc.name, "Bitcoin");
    assert_eq!(btc.current_price, 64250.12);
    assert_eq!(btc.price_change_24h_pct, Some(2.41));
    assert_eq!(btc.market_cap, Some(1265432100000.0));
    assert_eq!(btc.volume_24h, Some(35123456789.0));
    assert_eq!(btc.sparkline_7d.len(), 3);
    assert!(btc.image.as_deref().unwrap().ends_with("bitcoin.png"));

    let eth = &quotes[1];
    assert_eq!(eth.price_change_24h_pct, Some(-0.83));
    assert!(eth.sparkline_7d.is_empty());
}

#[test]
fn record_order_is_preserved() {
    let quotes = parse_markets(MARKETS_PAYLOAD).unwrap();
    let ids: Vec<&str> = quotes.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec!["bitcoin", "ethereum"]);
}

#[test]
fn record_without_price_is_skipped() {
    let payload = r#"[
      { "id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 64000.0 },
      { "id": "delisted", "symbol": "dls", "name": "Delisted", "current_price": null },
      { "id": "weird", "symbol": "wrd", "name": "Weird", "current_price": -3.0 }
    ]"#;

    let quotes = parse_markets(payload).unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].id, "bitcoin");
}

#[test]
fn missing_optional_fields_decode_as_none() {
    let payload = r#"[
      { "id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "current_price": 64000.0 }
    ]"#;

    let quotes = parse_markets(payload).unwrap();
    let btc = &quotes[0];
    assert_eq!(btc.image, None);
    assert_eq!(btc.market_cap, None);
    assert_eq!(btc.volume_24h, None);
    assert_eq!(btc.price_change_24h_pct, None);
    assert!(btc.sparkline_7d.is_empty());
}

#[test]
fn non_array_payload_is_an_api_error() {
    let err = parse_markets(r#"{"error": "rate limited"}"#).unwrap_err();
    match err {
        CoreError::Api { provider, message } => {
            assert_eq!(provider, "CoinGecko");
            assert!(message.contains("parse"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn truncated_payload_is_an_api_error() {
    assert!(parse_markets(r#"[{"id": "bitco"#).is_err());
}

#[test]
fn empty_array_is_a_valid_empty_market() {
    let quotes = parse_markets("[]").unwrap();
    assert!(quotes.is_empty());
}

#[test]
fn provider_name() {
    let provider = CoinGeckoProvider::default();
    assert_eq!(provider.name(), "CoinGecko");
}

#[test]
fn provider_accepts_custom_base_url() {
    // Constructor-level smoke test; the URL is exercised against a stub
    // upstream in hosts, not here.
    let _provider = CoinGeckoProvider::new(10, false).with_base_url("http://localhost:9999");
}
