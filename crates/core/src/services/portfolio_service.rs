use crate::errors::CoreError;
use crate::models::asset::AssetRef;
use crate::models::position::{PortfolioPosition, PositionValuation};
use crate::models::snapshot::MarketSnapshot;

/// Weighted-average-cost accounting for portfolio positions.
///
/// Pure business logic — no I/O. The engine passes the position collection
/// in; persistence happens at the call site.
pub struct PortfolioLedger;

impl PortfolioLedger {
    pub fn new() -> Self {
        Self
    }

    /// Record a buy of `amount` units at `buy_price` USD per unit.
    ///
    /// Opens a new position, or folds the buy into an existing one with a
    /// lifetime amount-weighted average cost:
    /// `avg' = (avg * old_amount + buy_price * amount) / (old_amount + amount)`.
    ///
    /// The running average is order-independent for a fixed set of buys.
    /// Non-positive or non-finite inputs are rejected before any mutation.
    pub fn upsert(
        &self,
        positions: &mut Vec<PortfolioPosition>,
        asset: &AssetRef,
        amount: f64,
        buy_price: f64,
    ) -> Result<(), CoreError> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Buy amount must be a positive number, got {amount}"
            )));
        }
        if !buy_price.is_finite() || buy_price <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Buy price must be a positive number, got {buy_price}"
            )));
        }

        if let Some(position) = positions.iter_mut().find(|p| p.id == asset.id) {
            // Both amounts are > 0, so the divisor can't be zero.
            let total = position.amount + amount;
            position.avg_buy_price =
                (position.avg_buy_price * position.amount + buy_price * amount) / total;
            position.amount = total;
        } else {
            positions.push(PortfolioPosition::new(asset, amount, buy_price));
        }
        Ok(())
    }

    /// Delete a position outright. Idempotent — removing an absent id is a
    /// no-op. Returns whether a position was actually removed.
    pub fn remove(&self, positions: &mut Vec<PortfolioPosition>, asset_id: &str) -> bool {
        let before = positions.len();
        positions.retain(|p| p.id != asset_id);
        positions.len() != before
    }

    /// Value one position against a snapshot.
    ///
    /// An asset missing from the snapshot values at zero rather than
    /// failing; its percentage gain is `None` since there is no price to
    /// compare against.
    #[must_use]
    pub fn valuation(
        &self,
        position: &PortfolioPosition,
        snapshot: &MarketSnapshot,
    ) -> PositionValuation {
        let price = snapshot.price_of(&position.id);
        let current_price = price.unwrap_or(0.0);
        let current_value = current_price * position.amount;
        let unrealized_pnl = current_value - position.cost_basis();
        let unrealized_pnl_pct = match price {
            Some(p) if position.avg_buy_price > 0.0 => {
                Some((p - position.avg_buy_price) / position.avg_buy_price * 100.0)
            }
            _ => None,
        };

        PositionValuation {
            current_price,
            current_value,
            unrealized_pnl,
            unrealized_pnl_pct,
        }
    }

    /// Total portfolio value against a snapshot.
    #[must_use]
    pub fn total_value(&self, positions: &[PortfolioPosition], snapshot: &MarketSnapshot) -> f64 {
        positions
            .iter()
            .map(|p| self.valuation(p, snapshot).current_value)
            .sum()
    }
}

impl Default for PortfolioLedger {
    fn default() -> Self {
        Self::new()
    }
}
