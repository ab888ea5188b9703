use serde::{Deserialize, Serialize};

/// A reference to a tracked asset as reported by the market data provider.
///
/// **Equality and hashing** are based solely on `id` — the provider's
/// stable identifier (e.g., "bitcoin"). `symbol` and `name` are display
/// fields captured at the time the reference was taken; records that embed
/// an `AssetRef` copy these fields by value and never look them up again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRef {
    /// Stable provider identifier (e.g., "bitcoin")
    pub id: String,

    /// Ticker symbol as reported by the provider (e.g., "btc")
    pub symbol: String,

    /// Human-readable name (e.g., "Bitcoin")
    pub name: String,
}

impl PartialEq for AssetRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for AssetRef {}

impl std::hash::Hash for AssetRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl AssetRef {
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}
