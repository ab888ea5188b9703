use crate::models::settings::FiatRateTable;
use crate::models::snapshot::MarketSnapshot;

/// One side of a conversion: either a tracked asset or a fiat currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionUnit {
    /// A tracked asset, by provider id (e.g., "bitcoin")
    Asset(String),
    /// A fiat currency, by code (e.g., "usd")
    Fiat(String),
}

impl ConversionUnit {
    pub fn asset(id: impl Into<String>) -> Self {
        ConversionUnit::Asset(id.into())
    }

    pub fn fiat(code: impl Into<String>) -> Self {
        ConversionUnit::Fiat(code.into())
    }
}

/// The converter's current from/to selection.
///
/// `swap` exchanges both sides in one step; because each unit carries its
/// own sub-selection, a half-swapped state is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterSelection {
    pub from: ConversionUnit,
    pub to: ConversionUnit,
}

impl ConverterSelection {
    pub fn new(from: ConversionUnit, to: ConversionUnit) -> Self {
        Self { from, to }
    }

    /// Exchange the from/to selections as a single state transition.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }
}

/// Stateless unit conversion over a snapshot plus the static fiat table.
pub struct ConversionEngine;

impl ConversionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Convert `amount` from one unit to another.
    ///
    /// Asset prices come from the snapshot (USD); fiat rates from the
    /// static table (USD base). Returns `None` when a needed price or rate
    /// is unavailable, or when a division would hit a zero price or rate —
    /// unknown fiat codes are unavailable, not silently 1:1.
    #[must_use]
    pub fn convert(
        &self,
        amount: f64,
        from: &ConversionUnit,
        to: &ConversionUnit,
        snapshot: &MarketSnapshot,
        rates: &FiatRateTable,
    ) -> Option<f64> {
        match (from, to) {
            (ConversionUnit::Asset(from_id), ConversionUnit::Asset(to_id)) => {
                let from_price = snapshot.price_of(from_id)?;
                let to_price = snapshot.price_of(to_id)?;
                if to_price == 0.0 {
                    return None;
                }
                Some(amount * from_price / to_price)
            }
            (ConversionUnit::Asset(from_id), ConversionUnit::Fiat(to_code)) => {
                let price = snapshot.price_of(from_id)?;
                let rate = rates.rate(to_code)?;
                Some(amount * price * rate)
            }
            (ConversionUnit::Fiat(from_code), ConversionUnit::Asset(to_id)) => {
                let rate = rates.rate(from_code)?;
                let to_price = snapshot.price_of(to_id)?;
                if to_price == 0.0 {
                    return None;
                }
                Some(amount * rate / to_price)
            }
            (ConversionUnit::Fiat(from_code), ConversionUnit::Fiat(to_code)) => {
                let from_rate = rates.rate(from_code)?;
                let to_rate = rates.rate(to_code)?;
                if from_rate == 0.0 {
                    return None;
                }
                Some(amount * to_rate / from_rate)
            }
        }
    }
}

impl Default for ConversionEngine {
    fn default() -> Self {
        Self::new()
    }
}
