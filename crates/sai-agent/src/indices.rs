//! Reverse lookups from hardware identity to software identity.
//!
//! Written by the reconciliation path, read concurrently by the stats and
//! event paths.

use dashmap::DashMap;
use sai_store::kinds::PortSaiId;
use switch_types::PortId;

#[derive(Debug, Default)]
pub struct ConcurrentIndices {
    port_ids: DashMap<PortSaiId, PortId>,
}

impl ConcurrentIndices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records which software port a hardware port belongs to.
    pub fn insert_port(&self, port_key: PortSaiId, id: PortId) -> Option<PortId> {
        self.port_ids.insert(port_key, id)
    }

    pub fn erase_port(&self, port_key: PortSaiId) -> Option<PortId> {
        self.port_ids.remove(&port_key).map(|(_, id)| id)
    }

    pub fn port_id(&self, port_key: PortSaiId) -> Option<PortId> {
        self.port_ids.get(&port_key).map(|entry| *entry.value())
    }

    pub fn port_count(&self) -> usize {
        self.port_ids.len()
    }
}
