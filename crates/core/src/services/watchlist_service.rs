use crate::models::asset::AssetRef;
use crate::models::snapshot::MarketSnapshot;
use crate::models::watchlist::{WatchlistEntry, WatchlistQuote};

/// Membership logic for the watchlist. No numeric logic beyond the join.
pub struct WatchlistManager;

impl WatchlistManager {
    pub fn new() -> Self {
        Self
    }

    /// Set-insert: adding an asset already on the list is a no-op.
    /// Returns whether a new entry was inserted.
    pub fn add(&self, entries: &mut Vec<WatchlistEntry>, asset: &AssetRef) -> bool {
        if entries.iter().any(|e| e.id == asset.id) {
            return false;
        }
        entries.push(WatchlistEntry::new(asset));
        true
    }

    /// Remove an asset from the watchlist. Idempotent.
    pub fn remove(&self, entries: &mut Vec<WatchlistEntry>, asset_id: &str) -> bool {
        let before = entries.len();
        entries.retain(|e| e.id != asset_id);
        entries.len() != before
    }

    /// Join entries against the snapshot, in watchlist order.
    ///
    /// Entries without market data are kept with a zero price and empty
    /// optional fields — every watched asset is always rendered.
    #[must_use]
    pub fn enrich(
        &self,
        entries: &[WatchlistEntry],
        snapshot: &MarketSnapshot,
    ) -> Vec<WatchlistQuote> {
        entries
            .iter()
            .map(|entry| match snapshot.get(&entry.id) {
                Some(quote) => WatchlistQuote {
                    entry: entry.clone(),
                    current_price: quote.current_price,
                    price_change_24h_pct: quote.price_change_24h_pct,
                    image: quote.image.clone(),
                },
                None => WatchlistQuote {
                    entry: entry.clone(),
                    current_price: 0.0,
                    price_change_24h_pct: None,
                    image: None,
                },
            })
            .collect()
    }
}

impl Default for WatchlistManager {
    fn default() -> Self {
        Self::new()
    }
}
