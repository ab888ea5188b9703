use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::asset::AssetRef;

/// A watched asset. Set semantics — at most one entry per asset `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    /// Provider identifier of the watched asset
    pub id: String,

    /// Ticker symbol, copied at the time of watching
    pub symbol: String,

    /// Display name, copied at the time of watching
    pub name: String,

    /// When the asset was added to the watchlist
    pub added_at: DateTime<Utc>,
}

impl WatchlistEntry {
    pub fn new(asset: &AssetRef) -> Self {
        Self {
            id: asset.id.clone(),
            symbol: asset.symbol.clone(),
            name: asset.name.clone(),
            added_at: Utc::now(),
        }
    }
}

/// A watchlist entry joined with the latest market data.
///
/// Entries with no data in the snapshot still produce a quote, with a zero
/// price and empty optional fields — a watched asset is always rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchlistQuote {
    pub entry: WatchlistEntry,

    /// Current price in USD, 0.0 when unknown
    pub current_price: f64,

    /// 24h price change in percent, when the provider reported one
    pub price_change_24h_pct: Option<f64>,

    /// Icon URL from the provider, when available
    pub image: Option<String>,
}
