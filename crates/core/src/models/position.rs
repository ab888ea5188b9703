use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::asset::AssetRef;

/// A portfolio holding of one asset: quantity plus cost basis.
///
/// Keyed by `id` — the owning collection never contains two positions for
/// the same asset. `amount` and `avg_buy_price` change only through the
/// ledger's weighted-average upsert; there is no partial sell, removal
/// deletes the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    /// Provider identifier of the held asset
    pub id: String,

    /// Ticker symbol, copied from the asset reference at creation
    pub symbol: String,

    /// Display name, copied from the asset reference at creation
    pub name: String,

    /// Quantity held (always > 0 while the position exists)
    pub amount: f64,

    /// Lifetime amount-weighted average purchase price, in USD
    pub avg_buy_price: f64,

    /// When the position was first opened
    pub added_at: DateTime<Utc>,
}

impl PortfolioPosition {
    pub fn new(asset: &AssetRef, amount: f64, buy_price: f64) -> Self {
        Self {
            id: asset.id.clone(),
            symbol: asset.symbol.clone(),
            name: asset.name.clone(),
            amount,
            avg_buy_price: buy_price,
            added_at: Utc::now(),
        }
    }

    /// Total cost basis of the position (`avg_buy_price * amount`).
    #[must_use]
    pub fn cost_basis(&self) -> f64 {
        self.avg_buy_price * self.amount
    }
}

/// Derived valuation of one position against a market snapshot.
///
/// Never stored — recomputed from the latest snapshot on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionValuation {
    /// Current market price, 0.0 when the snapshot has no data for the asset
    pub current_price: f64,

    /// `current_price * amount`
    pub current_value: f64,

    /// `current_value - cost_basis`
    pub unrealized_pnl: f64,

    /// Percentage gain/loss relative to the average buy price.
    /// `None` when no price is known or the average buy price is zero.
    pub unrealized_pnl_pct: Option<f64>,
}
