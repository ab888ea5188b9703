use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::asset::AssetRef;

/// Maximum sparkline samples kept per asset (7 days of hourly data).
pub const MAX_SPARKLINE_SAMPLES: usize = 7 * 24;

/// Current market data for a single asset, as of one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetQuote {
    /// Stable provider identifier (e.g., "bitcoin")
    pub id: String,

    /// Ticker symbol (e.g., "btc")
    pub symbol: String,

    /// Display name (e.g., "Bitcoin")
    pub name: String,

    /// Icon URL, when the provider reported one
    pub image: Option<String>,

    /// Current price in USD (finite, non-negative)
    pub current_price: f64,

    /// 24h price change in percent
    pub price_change_24h_pct: Option<f64>,

    /// Market capitalization in USD
    pub market_cap: Option<f64>,

    /// 24h traded volume in USD
    pub volume_24h: Option<f64>,

    /// 7-day price series, capped at [`MAX_SPARKLINE_SAMPLES`] samples
    pub sparkline_7d: Vec<f64>,
}

impl AssetQuote {
    /// Capture an [`AssetRef`] from this quote.
    #[must_use]
    pub fn asset_ref(&self) -> AssetRef {
        AssetRef::new(&self.id, &self.symbol, &self.name)
    }
}

/// Sort order for market listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketSortOrder {
    /// Largest market cap first (the provider's native order)
    MarketCap,
    /// Highest price first
    Price,
    /// Largest 24h gain first
    Change24h,
    /// Alphabetical by name
    Name,
}

/// The full, atomically replaced set of current market data.
///
/// A snapshot is built once from a successful fetch and is immutable from
/// then on; consumers share it behind an `Arc` and never merge into it.
/// Quotes keep the provider's market-cap-descending order; lookups by asset
/// id go through an index built at construction.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    quotes: Vec<AssetQuote>,
    index: HashMap<String, usize>,
    fetched_at: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    /// Build a snapshot from fetched quotes.
    ///
    /// Non-finite sparkline samples are dropped and series are capped at
    /// [`MAX_SPARKLINE_SAMPLES`]. On a duplicate asset id the first
    /// (higher-ranked) quote wins the index slot.
    #[must_use]
    pub fn new(mut quotes: Vec<AssetQuote>) -> Self {
        for quote in &mut quotes {
            quote.sparkline_7d.retain(|v| v.is_finite());
            quote.sparkline_7d.truncate(MAX_SPARKLINE_SAMPLES);
        }

        let mut index = HashMap::with_capacity(quotes.len());
        for (i, quote) in quotes.iter().enumerate() {
            index.entry(quote.id.clone()).or_insert(i);
        }

        Self {
            quotes,
            index,
            fetched_at: Some(Utc::now()),
        }
    }

    /// All quotes in the provider's market-cap-descending order.
    #[must_use]
    pub fn quotes(&self) -> &[AssetQuote] {
        &self.quotes
    }

    /// Look up one asset's quote by provider id.
    #[must_use]
    pub fn get(&self, asset_id: &str) -> Option<&AssetQuote> {
        self.index.get(asset_id).map(|&i| &self.quotes[i])
    }

    /// Current USD price of an asset. `None` for unknown ids — an unknown
    /// asset yields "no data", never a stale or defaulted price.
    #[must_use]
    pub fn price_of(&self, asset_id: &str) -> Option<f64> {
        self.get(asset_id).map(|q| q.current_price)
    }

    /// When this snapshot was fetched. `None` only for the initial empty
    /// snapshot published before the first successful refresh.
    #[must_use]
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    // ── Listing helpers ─────────────────────────────────────────────

    /// Quotes whose name or symbol contains `query` (case-insensitive).
    /// A blank query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&AssetQuote> {
        let q = query.trim().to_lowercase();
        self.quotes
            .iter()
            .filter(|c| {
                q.is_empty()
                    || c.name.to_lowercase().contains(&q)
                    || c.symbol.to_lowercase().contains(&q)
            })
            .collect()
    }

    /// Quotes re-sorted for display. Missing numeric fields sort as zero.
    #[must_use]
    pub fn sorted_by(&self, order: MarketSortOrder) -> Vec<&AssetQuote> {
        let mut quotes: Vec<&AssetQuote> = self.quotes.iter().collect();
        match order {
            MarketSortOrder::MarketCap => quotes.sort_by(|a, b| {
                let (a, b) = (a.market_cap.unwrap_or(0.0), b.market_cap.unwrap_or(0.0));
                b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
            }),
            MarketSortOrder::Price => quotes.sort_by(|a, b| {
                b.current_price
                    .partial_cmp(&a.current_price)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            MarketSortOrder::Change24h => quotes.sort_by(|a, b| {
                let (a, b) = (
                    a.price_change_24h_pct.unwrap_or(0.0),
                    b.price_change_24h_pct.unwrap_or(0.0),
                );
                b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
            }),
            MarketSortOrder::Name => quotes.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        quotes
    }

    /// Quotes with a positive 24h change.
    #[must_use]
    pub fn gainers(&self) -> Vec<&AssetQuote> {
        self.quotes
            .iter()
            .filter(|c| c.price_change_24h_pct.is_some_and(|p| p > 0.0))
            .collect()
    }
}
