use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::snapshot::{AssetQuote, MarketSnapshot};
use crate::providers::traits::MarketDataProvider;

/// Outcome of a refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new snapshot was fetched and published.
    Updated,
    /// Another refresh was already in flight; nothing was fetched.
    Skipped,
    /// The fetch completed, but a fetch that started later has already
    /// published — the result was thrown away.
    Discarded,
}

/// Marker for a fetch that has begun; carries its start-order sequence.
/// Not clonable — one begun fetch publishes at most once.
#[derive(Debug)]
pub struct FetchStart {
    seq: u64,
}

#[derive(Default)]
struct FetchState {
    snapshot: Arc<MarketSnapshot>,
    /// Start sequence of the published snapshot (0 = nothing published yet)
    applied_seq: u64,
    last_error: Option<String>,
}

/// Fetches and publishes the market snapshot.
///
/// Concurrency policy:
/// - [`refresh`](Self::refresh) is gated to at most one in-flight request;
///   an attempt while one is outstanding returns [`RefreshOutcome::Skipped`]
///   without touching the upstream.
/// - Snapshots are ordered by *fetch start*: a completion whose start
///   sequence is older than the published snapshot's is discarded, so a
///   slow stale request can never overwrite fresher data.
///
/// On failure the previously published snapshot is retained and a
/// human-readable error message is raised as the staleness flag; the next
/// scheduled attempt proceeds normally (no backoff escalation).
pub struct SnapshotFetcher {
    provider: Arc<dyn MarketDataProvider>,
    state: RwLock<FetchState>,
    in_flight: AtomicBool,
    next_seq: AtomicU64,
}

/// Clears the in-flight gate even if the refresh future is dropped mid-await.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SnapshotFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            state: RwLock::new(FetchState::default()),
            in_flight: AtomicBool::new(false),
            next_seq: AtomicU64::new(1),
        }
    }

    /// The latest published snapshot. Shared handle — the snapshot behind
    /// it never changes; a refresh swaps the whole `Arc`.
    #[must_use]
    pub fn latest(&self) -> Arc<MarketSnapshot> {
        Arc::clone(&self.read_state().snapshot)
    }

    /// Message of the most recent failed refresh, cleared by the next
    /// successful one. `Some` means the published snapshot is stale.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.read_state().last_error.clone()
    }

    /// Whether the published snapshot is known to be stale.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.read_state().last_error.is_some()
    }

    /// Fetch from the provider and publish the result.
    ///
    /// At most one refresh runs at a time; a call while another is in
    /// flight returns `Ok(Skipped)`. Fetch failures set the staleness flag,
    /// keep the last good snapshot, and are returned to the caller.
    pub async fn refresh(&self) -> Result<RefreshOutcome, CoreError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(provider = self.provider.name(), "refresh already in flight; skipping");
            return Ok(RefreshOutcome::Skipped);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let start = self.begin();
        let result = self.provider.fetch_markets().await;
        self.publish(start, result)
    }

    /// Reserve a start-ordered slot for a fetch whose transport the caller
    /// drives itself. [`refresh`](Self::refresh) composes this with the
    /// in-flight gate; callers using `begin`/`publish` directly get only
    /// the ordering guarantee.
    #[must_use]
    pub fn begin(&self) -> FetchStart {
        FetchStart {
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Publish the completed result of a begun fetch.
    ///
    /// A completion older than the published snapshot is discarded outright
    /// — it neither replaces the snapshot nor raises the staleness flag.
    pub fn publish(
        &self,
        start: FetchStart,
        result: Result<Vec<AssetQuote>, CoreError>,
    ) -> Result<RefreshOutcome, CoreError> {
        let mut state = self.write_state();
        if start.seq < state.applied_seq {
            debug!(
                seq = start.seq,
                applied = state.applied_seq,
                "discarding fetch that lost to a later-started one"
            );
            return Ok(RefreshOutcome::Discarded);
        }

        match result {
            Ok(quotes) => {
                let snapshot = MarketSnapshot::new(quotes);
                debug!(assets = snapshot.len(), "published market snapshot");
                state.snapshot = Arc::new(snapshot);
                state.applied_seq = start.seq;
                state.last_error = None;
                Ok(RefreshOutcome::Updated)
            }
            Err(e) => {
                warn!(error = %e, "market refresh failed; keeping last good snapshot");
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, FetchState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, FetchState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
