pub mod errors;
pub mod models;
pub mod notify;
pub mod providers;
pub mod services;
pub mod storage;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use errors::CoreError;
use models::{
    alert::{Alert, AlertCondition},
    asset::AssetRef,
    position::{PortfolioPosition, PositionValuation},
    settings::TrackerSettings,
    snapshot::MarketSnapshot,
    watchlist::{WatchlistEntry, WatchlistQuote},
};
use notify::{LogNotifier, Notifier};
use providers::coingecko::CoinGeckoProvider;
use providers::traits::MarketDataProvider;
use services::{
    alert_service::AlertEngine,
    converter_service::{ConversionEngine, ConversionUnit},
    fetcher::{RefreshOutcome, SnapshotFetcher},
    portfolio_service::PortfolioLedger,
    watchlist_service::WatchlistManager,
};
use storage::store::{CollectionStore, ALERTS_SLOT, PORTFOLIO_SLOT, WATCHLIST_SLOT};

/// The three persisted collections, owned exclusively by the engine.
#[derive(Debug, Default)]
struct Collections {
    portfolio: Vec<PortfolioPosition>,
    watchlist: Vec<WatchlistEntry>,
    alerts: Vec<Alert>,
}

/// State shared between the engine facade and the periodic refresh task.
struct EngineShared {
    collections: Mutex<Collections>,
    store: CollectionStore,
    notifier: Box<dyn Notifier>,
    fetcher: SnapshotFetcher,
    ledger: PortfolioLedger,
    watchlist: WatchlistManager,
    alerts: AlertEngine,
}

impl EngineShared {
    fn lock_collections(&self) -> MutexGuard<'_, Collections> {
        self.collections.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write-through persistence. A failed write is logged and swallowed:
    /// durability is best-effort and never blocks or reverts a mutation.
    fn persist<T: Serialize>(&self, slot: &str, records: &[T]) {
        if let Err(e) = self.store.save(slot, records) {
            warn!(slot, error = %e, "failed to persist collection");
        }
    }

    /// One refresh cycle: fetch, publish, then evaluate alerts against the
    /// fresh snapshot. Triggered alerts are persisted in the same cycle.
    async fn refresh_and_evaluate(&self) -> Result<RefreshOutcome, CoreError> {
        let outcome = self.fetcher.refresh().await?;

        if outcome == RefreshOutcome::Updated {
            let snapshot = self.fetcher.latest();
            let mut collections = self.lock_collections();
            let triggered =
                self.alerts
                    .evaluate(&mut collections.alerts, &snapshot, self.notifier.as_ref());
            if !triggered.is_empty() {
                self.persist(ALERTS_SLOT, &collections.alerts);
            }
            debug!(
                assets = snapshot.len(),
                triggered = triggered.len(),
                "snapshot refresh applied"
            );
        }

        Ok(outcome)
    }
}

/// Main entry point: the shared market-tracking state engine.
///
/// Owns the portfolio/watchlist/alert collections, persists every mutation
/// through [`CollectionStore`], publishes the latest [`MarketSnapshot`] and
/// evaluates alerts on every refresh. Explicitly constructed and passed by
/// reference to all consumers; lifecycle is `open → start → … → close`
/// (dropping the engine also stops the refresh loop).
#[must_use]
pub struct MarketTracker {
    shared: Arc<EngineShared>,
    settings: TrackerSettings,
    converter: ConversionEngine,
    refresh_task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for MarketTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let collections = self.shared.lock_collections();
        f.debug_struct("MarketTracker")
            .field("positions", &collections.portfolio.len())
            .field("watchlist", &collections.watchlist.len())
            .field("alerts", &collections.alerts.len())
            .field("running", &self.refresh_task.is_some())
            .finish()
    }
}

impl MarketTracker {
    /// Open an engine with the default CoinGecko provider and the logging
    /// notifier fallback. Collections are loaded from `data_dir`; corrupt
    /// or missing slots start empty.
    pub fn open(
        data_dir: impl Into<PathBuf>,
        settings: TrackerSettings,
    ) -> Result<Self, CoreError> {
        let provider = Arc::new(CoinGeckoProvider::new(
            settings.markets_per_page,
            settings.sparkline,
        ));
        Self::with_parts(data_dir, settings, provider, Box::new(LogNotifier))
    }

    /// Open an engine with an injected provider and notifier — for tests,
    /// or for hosts with a real notification channel or alternate upstream.
    pub fn with_parts(
        data_dir: impl Into<PathBuf>,
        settings: TrackerSettings,
        provider: Arc<dyn MarketDataProvider>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self, CoreError> {
        let store = CollectionStore::open(data_dir)?;
        let collections = Collections {
            portfolio: store.load(PORTFOLIO_SLOT),
            watchlist: store.load(WATCHLIST_SLOT),
            alerts: store.load(ALERTS_SLOT),
        };

        let shared = Arc::new(EngineShared {
            collections: Mutex::new(collections),
            store,
            notifier,
            fetcher: SnapshotFetcher::new(provider),
            ledger: PortfolioLedger::new(),
            watchlist: WatchlistManager::new(),
            alerts: AlertEngine::new(),
        });

        Ok(Self {
            shared,
            settings,
            converter: ConversionEngine::new(),
            refresh_task: None,
        })
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Start the periodic refresh loop: one immediate refresh, then one per
    /// configured interval, each successful one evaluating active alerts.
    /// Must be called from within a tokio runtime. Idempotent while running.
    pub fn start(&mut self) {
        if self.refresh_task.is_some() {
            return;
        }
        let shared = Arc::clone(&self.shared);
        // interval(0) panics; one second is the shortest sane cadence.
        let period = self
            .settings
            .refresh_interval()
            .max(std::time::Duration::from_secs(1));
        self.refresh_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                // First tick fires immediately: refresh once at startup.
                ticker.tick().await;
                // Failures are recorded in the fetcher's staleness flag and
                // retried on the next tick; no backoff escalation.
                let _ = shared.refresh_and_evaluate().await;
            }
        }));
    }

    /// Whether the periodic refresh loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.refresh_task.is_some()
    }

    /// Stop the refresh loop. Any in-flight fetch is discarded, not awaited.
    pub fn close(&mut self) {
        if let Some(task) = self.refresh_task.take() {
            task.abort();
        }
    }

    // ── Market Data ─────────────────────────────────────────────────

    /// Trigger a refresh outside the periodic schedule (user-initiated).
    /// Obeys the at-most-one-in-flight rule; a successful refresh also
    /// evaluates alerts, exactly like a scheduled one.
    pub async fn refresh_now(&self) -> Result<RefreshOutcome, CoreError> {
        self.shared.refresh_and_evaluate().await
    }

    /// The latest published snapshot. Shared handle — replaced wholesale on
    /// each successful refresh, never mutated in place.
    #[must_use]
    pub fn snapshot(&self) -> Arc<MarketSnapshot> {
        self.shared.fetcher.latest()
    }

    /// Message of the most recent failed refresh, if the published snapshot
    /// is stale. Cleared by the next successful refresh.
    #[must_use]
    pub fn fetch_error(&self) -> Option<String> {
        self.shared.fetcher.last_error()
    }

    /// Whether the published snapshot is known to be stale.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.shared.fetcher.is_stale()
    }

    // ── Portfolio ───────────────────────────────────────────────────

    /// Record a buy: open a position or fold into the existing one at the
    /// amount-weighted average cost. Persists the portfolio on success.
    pub fn add_position(
        &self,
        asset: &AssetRef,
        amount: f64,
        buy_price: f64,
    ) -> Result<(), CoreError> {
        let mut collections = self.shared.lock_collections();
        self.shared
            .ledger
            .upsert(&mut collections.portfolio, asset, amount, buy_price)?;
        self.shared.persist(PORTFOLIO_SLOT, &collections.portfolio);
        Ok(())
    }

    /// Delete a whole position. Idempotent; persists when something changed.
    pub fn remove_position(&self, asset_id: &str) -> bool {
        let mut collections = self.shared.lock_collections();
        let removed = self
            .shared
            .ledger
            .remove(&mut collections.portfolio, asset_id);
        if removed {
            self.shared.persist(PORTFOLIO_SLOT, &collections.portfolio);
        }
        removed
    }

    /// Current positions, in insertion order.
    #[must_use]
    pub fn positions(&self) -> Vec<PortfolioPosition> {
        self.shared.lock_collections().portfolio.clone()
    }

    /// Positions paired with their valuation against the latest snapshot.
    #[must_use]
    pub fn position_valuations(&self) -> Vec<(PortfolioPosition, PositionValuation)> {
        let snapshot = self.snapshot();
        let collections = self.shared.lock_collections();
        collections
            .portfolio
            .iter()
            .map(|p| (p.clone(), self.shared.ledger.valuation(p, &snapshot)))
            .collect()
    }

    /// Total portfolio value against the latest snapshot.
    #[must_use]
    pub fn total_value(&self) -> f64 {
        let snapshot = self.snapshot();
        let collections = self.shared.lock_collections();
        self.shared
            .ledger
            .total_value(&collections.portfolio, &snapshot)
    }

    // ── Watchlist ───────────────────────────────────────────────────

    /// Add an asset to the watchlist (set semantics). Persists on change.
    pub fn watch(&self, asset: &AssetRef) -> bool {
        let mut collections = self.shared.lock_collections();
        let added = self.shared.watchlist.add(&mut collections.watchlist, asset);
        if added {
            self.shared.persist(WATCHLIST_SLOT, &collections.watchlist);
        }
        added
    }

    /// Remove an asset from the watchlist. Idempotent.
    pub fn unwatch(&self, asset_id: &str) -> bool {
        let mut collections = self.shared.lock_collections();
        let removed = self
            .shared
            .watchlist
            .remove(&mut collections.watchlist, asset_id);
        if removed {
            self.shared.persist(WATCHLIST_SLOT, &collections.watchlist);
        }
        removed
    }

    /// Watchlist entries, in the order they were added.
    #[must_use]
    pub fn watchlist(&self) -> Vec<WatchlistEntry> {
        self.shared.lock_collections().watchlist.clone()
    }

    /// Watchlist entries joined with the latest snapshot; entries with no
    /// market data are kept with zeroed fields.
    #[must_use]
    pub fn watchlist_quotes(&self) -> Vec<WatchlistQuote> {
        let snapshot = self.snapshot();
        let collections = self.shared.lock_collections();
        self.shared
            .watchlist
            .enrich(&collections.watchlist, &snapshot)
    }

    // ── Alerts ──────────────────────────────────────────────────────

    /// Create an active price alert. Persists on success.
    pub fn create_alert(
        &self,
        asset: &AssetRef,
        target_price: f64,
        condition: AlertCondition,
    ) -> Result<Uuid, CoreError> {
        let mut collections = self.shared.lock_collections();
        let id = self
            .shared
            .alerts
            .create(&mut collections.alerts, asset, target_price, condition)?;
        self.shared.persist(ALERTS_SLOT, &collections.alerts);
        Ok(id)
    }

    /// Flip an alert between active and paused. Returns the new state.
    pub fn toggle_alert(&self, alert_id: Uuid) -> Result<bool, CoreError> {
        let mut collections = self.shared.lock_collections();
        let state = self
            .shared
            .alerts
            .toggle(&mut collections.alerts, alert_id)?;
        self.shared.persist(ALERTS_SLOT, &collections.alerts);
        Ok(state)
    }

    /// Delete an alert. Idempotent; persists when something changed.
    pub fn delete_alert(&self, alert_id: Uuid) -> bool {
        let mut collections = self.shared.lock_collections();
        let removed = self.shared.alerts.delete(&mut collections.alerts, alert_id);
        if removed {
            self.shared.persist(ALERTS_SLOT, &collections.alerts);
        }
        removed
    }

    /// All alerts, active and inactive, in creation order.
    #[must_use]
    pub fn alerts(&self) -> Vec<Alert> {
        self.shared.lock_collections().alerts.clone()
    }

    /// Percentage distance between an alert's target and the current price.
    /// `None` for an unknown alert id or when no price is available.
    #[must_use]
    pub fn alert_distance(&self, alert_id: Uuid) -> Option<f64> {
        let snapshot = self.snapshot();
        let collections = self.shared.lock_collections();
        let alert = collections.alerts.iter().find(|a| a.id == alert_id)?;
        self.shared.alerts.distance_to_target(alert, &snapshot)
    }

    // ── Converter ───────────────────────────────────────────────────

    /// Convert an amount between two units against the latest snapshot and
    /// the configured fiat table. `None` when a price or rate is missing.
    #[must_use]
    pub fn convert(&self, amount: f64, from: &ConversionUnit, to: &ConversionUnit) -> Option<f64> {
        self.converter.convert(
            amount,
            from,
            to,
            &self.snapshot(),
            &self.settings.fiat_rates,
        )
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }
}

impl Drop for MarketTracker {
    fn drop(&mut self) {
        self.close();
    }
}
