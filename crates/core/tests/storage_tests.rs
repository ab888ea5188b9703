// ═══════════════════════════════════════════════════════════════════
// Storage Tests — CollectionStore slots, corruption recovery
// ═══════════════════════════════════════════════════════════════════

use market_tracker_core::models::alert::{Alert, AlertCondition};
use market_tracker_core::models::asset::AssetRef;
use market_tracker_core::models::position::PortfolioPosition;
use market_tracker_core::models::watchlist::WatchlistEntry;
use market_tracker_core::storage::store::{
    CollectionStore, ALERTS_SLOT, PORTFOLIO_SLOT, WATCHLIST_SLOT,
};

fn btc() -> AssetRef {
    AssetRef::new("bitcoin", "btc", "Bitcoin")
}

fn eth() -> AssetRef {
    AssetRef::new("ethereum", "eth", "Ethereum")
}

#[test]
fn open_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("data").join("tracker");
    let _store = CollectionStore::open(&nested).unwrap();
    assert!(nested.is_dir());
}

#[test]
fn missing_slot_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::open(dir.path()).unwrap();
    let positions: Vec<PortfolioPosition> = store.load(PORTFOLIO_SLOT);
    assert!(positions.is_empty());
}

#[test]
fn portfolio_round_trip_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::open(dir.path()).unwrap();

    let positions = vec![
        PortfolioPosition::new(&btc(), 1.5, 40_000.0),
        PortfolioPosition::new(&eth(), 10.0, 2_000.0),
    ];
    store.save(PORTFOLIO_SLOT, &positions).unwrap();

    let loaded: Vec<PortfolioPosition> = store.load(PORTFOLIO_SLOT);
    assert_eq!(loaded, positions);
}

#[test]
fn watchlist_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::open(dir.path()).unwrap();

    let entries = vec![WatchlistEntry::new(&btc()), WatchlistEntry::new(&eth())];
    store.save(WATCHLIST_SLOT, &entries).unwrap();

    let loaded: Vec<WatchlistEntry> = store.load(WATCHLIST_SLOT);
    assert_eq!(loaded, entries);
}

#[test]
fn alerts_round_trip_preserves_state() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::open(dir.path()).unwrap();

    let mut alerts = vec![
        Alert::new(&btc(), 70_000.0, AlertCondition::Above),
        Alert::new(&eth(), 1_500.0, AlertCondition::Below),
    ];
    alerts[1].is_active = false;
    store.save(ALERTS_SLOT, &alerts).unwrap();

    let loaded: Vec<Alert> = store.load(ALERTS_SLOT);
    assert_eq!(loaded, alerts);
    assert!(!loaded[1].is_active);
}

#[test]
fn save_replaces_previous_contents() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::open(dir.path()).unwrap();

    store
        .save(PORTFOLIO_SLOT, &[PortfolioPosition::new(&btc(), 1.0, 1.0)])
        .unwrap();
    store
        .save(PORTFOLIO_SLOT, &[PortfolioPosition::new(&eth(), 2.0, 2.0)])
        .unwrap();

    let loaded: Vec<PortfolioPosition> = store.load(PORTFOLIO_SLOT);
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "ethereum");
}

#[test]
fn empty_collection_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::open(dir.path()).unwrap();

    store.save::<PortfolioPosition>(PORTFOLIO_SLOT, &[]).unwrap();
    let loaded: Vec<PortfolioPosition> = store.load(PORTFOLIO_SLOT);
    assert!(loaded.is_empty());
}

#[test]
fn corrupt_slot_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::open(dir.path()).unwrap();

    std::fs::write(dir.path().join("portfolio.json"), "{not json at all").unwrap();
    let loaded: Vec<PortfolioPosition> = store.load(PORTFOLIO_SLOT);
    assert!(loaded.is_empty());
}

#[test]
fn wrong_shape_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::open(dir.path()).unwrap();

    // Valid JSON, but an object where an array of records is expected.
    std::fs::write(dir.path().join("alerts.json"), r#"{"oops": 1}"#).unwrap();
    let loaded: Vec<Alert> = store.load(ALERTS_SLOT);
    assert!(loaded.is_empty());
}

#[test]
fn corrupt_slot_is_recoverable_by_saving() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::open(dir.path()).unwrap();

    std::fs::write(dir.path().join("watchlist.json"), "garbage").unwrap();
    let entries = vec![WatchlistEntry::new(&btc())];
    store.save(WATCHLIST_SLOT, &entries).unwrap();

    let loaded: Vec<WatchlistEntry> = store.load(WATCHLIST_SLOT);
    assert_eq!(loaded, entries);
}

#[test]
fn slots_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let store = CollectionStore::open(dir.path()).unwrap();

    store
        .save(PORTFOLIO_SLOT, &[PortfolioPosition::new(&btc(), 1.0, 1.0)])
        .unwrap();
    store.save(WATCHLIST_SLOT, &[WatchlistEntry::new(&eth())]).unwrap();

    let positions: Vec<PortfolioPosition> = store.load(PORTFOLIO_SLOT);
    let entries: Vec<WatchlistEntry> = store.load(WATCHLIST_SLOT);
    let alerts: Vec<Alert> = store.load(ALERTS_SLOT);
    assert_eq!(positions.len(), 1);
    assert_eq!(entries.len(), 1);
    assert!(alerts.is_empty());
}
