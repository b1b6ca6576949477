//! Durable record of which adapter keys the store held.
//!
//! The snapshot stores only adapter keys, grouped by kind name. Host keys and
//! attributes are re-read from hardware when the snapshot is reloaded.

use crate::error::{SnapshotError, StoreResult};
use sai_api::RawSaiObjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Adapter keys per kind name, each list sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreSnapshot {
    shards: BTreeMap<String, Vec<RawSaiObjectId>>,
}

impl StoreSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the adapter keys of one kind.
    pub fn insert(&mut self, kind: &str, mut keys: Vec<RawSaiObjectId>) {
        keys.sort_unstable();
        self.shards.insert(kind.to_string(), keys);
    }

    /// Adapter keys recorded for `kind`, if the kind was recorded at all.
    pub fn keys(&self, kind: &str) -> Option<&[RawSaiObjectId]> {
        self.shards.get(kind).map(Vec::as_slice)
    }

    /// Total number of adapter keys across all kinds.
    pub fn object_count(&self) -> usize {
        self.shards.values().map(Vec::len).sum()
    }

    pub fn to_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(self).map_err(SnapshotError::from)?)
    }

    pub fn from_json(json: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(json).map_err(SnapshotError::from)?)
    }

    /// Writes the snapshot, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let io_error = |source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, self.to_json()?).map_err(io_error)?;
        Ok(())
    }

    pub fn load(path: &Path) -> StoreResult<Self> {
        let json = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
