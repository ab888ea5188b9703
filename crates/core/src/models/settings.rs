use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Static fiat exchange rates, quoted against a USD base (USD = 1.0).
///
/// Approximate by design — the system deliberately does not source live
/// forex rates. Unknown codes have no rate: conversions involving them are
/// unavailable rather than silently treated as 1:1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiatRateTable {
    /// Lowercase currency code → units per USD
    rates: HashMap<String, f64>,
}

impl Default for FiatRateTable {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert("usd".to_string(), 1.0);
        rates.insert("eur".to_string(), 0.91);
        rates.insert("gbp".to_string(), 0.78);
        Self { rates }
    }
}

impl FiatRateTable {
    /// A table with no rates at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            rates: HashMap::new(),
        }
    }

    /// Rate for a currency code, case-insensitive.
    /// `None` when the code is not in the table.
    #[must_use]
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(&code.to_lowercase()).copied()
    }

    /// Insert or replace a rate. Codes are normalized to lowercase.
    pub fn set_rate(&mut self, code: impl Into<String>, rate: f64) {
        self.rates.insert(code.into().to_lowercase(), rate);
    }

    /// All known codes, sorted.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

/// Tunable engine settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// Seconds between periodic snapshot refreshes.
    pub refresh_interval_secs: u64,

    /// How many top-market-cap assets to track per fetch.
    pub markets_per_page: u32,

    /// Whether to request 7-day sparkline series from the provider.
    pub sparkline: bool,

    /// Static fiat conversion rates used by the converter.
    pub fiat_rates: FiatRateTable,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 60,
            markets_per_page: 50,
            sparkline: true,
            fiat_rates: FiatRateTable::default(),
        }
    }
}

impl TrackerSettings {
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
