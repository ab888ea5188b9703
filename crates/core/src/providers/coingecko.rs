use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::traits::MarketDataProvider;
use crate::errors::CoreError;
use crate::models::snapshot::AssetQuote;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko API provider for cryptocurrency market data.
///
/// - **Free**: no API key required for the markets endpoint.
/// - **Endpoint**: `/coins/markets?vs_currency=usd&order=market_cap_desc`
/// - Prices are quoted in USD; conversion to other units happens downstream.
pub struct CoinGeckoProvider {
    client: Client,
    base_url: String,
    per_page: u32,
    sparkline: bool,
}

impl CoinGeckoProvider {
    pub fn new(per_page: u32, sparkline: bool) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: BASE_URL.to_string(),
            per_page,
            sparkline,
        }
    }

    /// Point the provider at a different upstream — a self-hosted proxy
    /// serving the same shape, or a local stub in tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for CoinGeckoProvider {
    fn default() -> Self {
        Self::new(50, true)
    }
}

// ── CoinGecko API response types ────────────────────────────────────

#[derive(Deserialize)]
struct MarketRecord {
    id: String,
    symbol: String,
    name: String,
    image: Option<String>,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    total_volume: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    sparkline_in_7d: Option<SparklineSeries>,
}

#[derive(Deserialize)]
struct SparklineSeries {
    price: Vec<f64>,
}

/// Decode a `/coins/markets` JSON body into quotes.
///
/// Records without a usable price (missing, non-finite, or negative) are
/// skipped — the upstream reports `null` for delisted or unpriced assets.
/// A body that isn't the expected array shape is an error.
pub fn parse_markets(body: &str) -> Result<Vec<AssetQuote>, CoreError> {
    let records: Vec<MarketRecord> = serde_json::from_str(body).map_err(|e| CoreError::Api {
        provider: "CoinGecko".into(),
        message: format!("Failed to parse markets payload: {e}"),
    })?;

    let quotes = records
        .into_iter()
        .filter_map(|record| {
            let price = match record.current_price {
                Some(p) if p.is_finite() && p >= 0.0 => p,
                _ => {
                    debug!(id = %record.id, "skipping market record without a usable price");
                    return None;
                }
            };
            Some(AssetQuote {
                id: record.id,
                symbol: record.symbol,
                name: record.name,
                image: record.image,
                current_price: price,
                price_change_24h_pct: record.price_change_percentage_24h,
                market_cap: record.market_cap,
                volume_24h: record.total_volume,
                sparkline_7d: record
                    .sparkline_in_7d
                    .map(|s| s.price)
                    .unwrap_or_default(),
            })
        })
        .collect();

    Ok(quotes)
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "CoinGecko"
    }

    async fn fetch_markets(&self) -> Result<Vec<AssetQuote>, CoreError> {
        let url = format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1&sparkline={}",
            self.base_url, self.per_page, self.sparkline
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: "CoinGecko".into(),
                message: format!("Upstream returned HTTP {status}"),
            });
        }

        let body = response.text().await?;
        parse_markets(&body)
    }
}
