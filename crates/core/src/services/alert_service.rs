use tracing::info;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::alert::{Alert, AlertCondition};
use crate::models::asset::AssetRef;
use crate::models::snapshot::MarketSnapshot;
use crate::notify::Notifier;

/// Creates, toggles and evaluates price alerts.
///
/// The trigger predicate is a pure function and delivery is injected, so
/// evaluation is testable without any platform notification capability.
pub struct AlertEngine;

impl AlertEngine {
    pub fn new() -> Self {
        Self
    }

    /// Create an active alert on an asset.
    /// The target price must be positive and finite.
    pub fn create(
        &self,
        alerts: &mut Vec<Alert>,
        asset: &AssetRef,
        target_price: f64,
        condition: AlertCondition,
    ) -> Result<Uuid, CoreError> {
        if !target_price.is_finite() || target_price <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Alert target price must be a positive number, got {target_price}"
            )));
        }
        let alert = Alert::new(asset, target_price, condition);
        let id = alert.id;
        alerts.push(alert);
        Ok(id)
    }

    /// Flip an alert between active and inactive.
    /// Returns the new `is_active` state.
    pub fn toggle(&self, alerts: &mut [Alert], alert_id: Uuid) -> Result<bool, CoreError> {
        let alert = alerts
            .iter_mut()
            .find(|a| a.id == alert_id)
            .ok_or_else(|| CoreError::AlertNotFound(alert_id.to_string()))?;
        alert.is_active = !alert.is_active;
        Ok(alert.is_active)
    }

    /// Delete an alert. Idempotent — deleting an unknown id is a no-op.
    pub fn delete(&self, alerts: &mut Vec<Alert>, alert_id: Uuid) -> bool {
        let before = alerts.len();
        alerts.retain(|a| a.id != alert_id);
        alerts.len() != before
    }

    /// Pure trigger predicate: does `current_price` satisfy the alert?
    #[must_use]
    pub fn condition_met(condition: AlertCondition, target_price: f64, current_price: f64) -> bool {
        match condition {
            AlertCondition::Above => current_price >= target_price,
            AlertCondition::Below => current_price <= target_price,
        }
    }

    /// How far the target is from the current price, in percent of the
    /// current price. `None` when the asset has no price or the price is
    /// zero.
    #[must_use]
    pub fn distance_to_target(&self, alert: &Alert, snapshot: &MarketSnapshot) -> Option<f64> {
        let price = snapshot.price_of(&alert.asset_id)?;
        if price == 0.0 {
            return None;
        }
        Some((alert.target_price - price) / price * 100.0)
    }

    /// Evaluate every active alert against a fresh snapshot.
    ///
    /// A satisfied alert delivers exactly one notification naming the asset
    /// and the observed price, then is deactivated — the cleared flag is the
    /// suppression mechanism, so a condition that stays satisfied on later
    /// snapshots does not re-trigger. Assets missing from the snapshot are
    /// skipped (no data, no decision).
    ///
    /// Returns the ids of triggered alerts so the caller can persist the
    /// collection.
    pub fn evaluate(
        &self,
        alerts: &mut [Alert],
        snapshot: &MarketSnapshot,
        notifier: &dyn Notifier,
    ) -> Vec<Uuid> {
        let mut triggered = Vec::new();

        for alert in alerts.iter_mut().filter(|a| a.is_active) {
            let Some(quote) = snapshot.get(&alert.asset_id) else {
                continue;
            };
            if !Self::condition_met(alert.condition, alert.target_price, quote.current_price) {
                continue;
            }

            let title = format!("Price Alert: {}", alert.asset_symbol.to_uppercase());
            let body = format!("{} has reached {} USD", alert.asset_name, quote.current_price);
            notifier.deliver(&title, &body, quote.image.as_deref());

            alert.is_active = false;
            info!(
                alert_id = %alert.id,
                asset = %alert.asset_id,
                price = quote.current_price,
                target = alert.target_price,
                "price alert triggered"
            );
            triggered.push(alert.id);
        }

        triggered
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}
