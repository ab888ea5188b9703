use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::AssetRef;

/// Direction of a price alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertCondition {
    /// Trigger once the price reaches or exceeds the target.
    Above,
    /// Trigger once the price falls to or below the target.
    Below,
}

impl std::fmt::Display for AlertCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertCondition::Above => write!(f, "above"),
            AlertCondition::Below => write!(f, "below"),
        }
    }
}

/// A price alert on one asset.
///
/// Lifecycle: created active → evaluated on every snapshot while active →
/// deactivated exactly once, either by triggering or by a user toggle.
/// Triggered and manually paused alerts share `is_active = false`; the
/// cleared flag is what suppresses re-triggering — there is no separate
/// de-dup record. Deletion is terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier, generated at creation and never reused
    pub id: Uuid,

    /// Provider identifier of the asset being watched
    pub asset_id: String,

    /// Ticker symbol, copied at creation
    pub asset_symbol: String,

    /// Display name, copied at creation
    pub asset_name: String,

    /// Price level that satisfies the alert, in USD (always > 0)
    pub target_price: f64,

    /// Above or Below
    pub condition: AlertCondition,

    /// When the alert was created
    pub created_at: DateTime<Utc>,

    /// Whether the alert is still being evaluated
    pub is_active: bool,
}

impl Alert {
    pub fn new(asset: &AssetRef, target_price: f64, condition: AlertCondition) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id: asset.id.clone(),
            asset_symbol: asset.symbol.clone(),
            asset_name: asset.name.clone(),
            target_price,
            condition,
            created_at: Utc::now(),
            is_active: true,
        }
    }
}
