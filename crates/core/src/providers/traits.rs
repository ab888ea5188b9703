use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::snapshot::AssetQuote;

/// Trait abstraction for market data sources.
///
/// The engine only ever sees this trait. If the upstream API changes or a
/// different source is preferred, only one implementation is replaced —
/// the rest of the codebase (and every test, via mocks) is untouched.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch current market data for the tracked assets, ordered by
    /// market cap descending. One call returns the whole universe the
    /// snapshot is built from — there is no per-asset fetch.
    async fn fetch_markets(&self) -> Result<Vec<AssetQuote>, CoreError>;
}
