use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

use crate::errors::CoreError;

/// Named slot holding the portfolio collection.
pub const PORTFOLIO_SLOT: &str = "portfolio";

/// Named slot holding the watchlist collection.
pub const WATCHLIST_SLOT: &str = "watchlist";

/// Named slot holding the alert collection.
pub const ALERTS_SLOT: &str = "alerts";

/// Durable key-value storage: one JSON array file per named collection.
///
/// Reads are forgiving — a missing or corrupt slot loads as an empty
/// collection so the engine always starts. Writes replace the whole slot.
pub struct CollectionStore {
    dir: PathBuf,
}

impl CollectionStore {
    /// Open the storage directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Load a collection from its slot.
    ///
    /// Missing or unparsable data yields an empty collection, never an
    /// error — corrupt storage must not keep the engine from starting.
    pub fn load<T: DeserializeOwned>(&self, slot: &str) -> Vec<T> {
        let path = self.slot_path(slot);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(slot, error = %e, "failed to read collection; starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!(slot, error = %e, "corrupt collection; starting empty");
                Vec::new()
            }
        }
    }

    /// Write a collection to its slot, replacing previous contents.
    pub fn save<T: Serialize>(&self, slot: &str, records: &[T]) -> Result<(), CoreError> {
        let json = serde_json::to_string(records)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize '{slot}': {e}")))?;
        std::fs::write(self.slot_path(slot), json)?;
        Ok(())
    }

    fn slot_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}.json"))
    }
}
