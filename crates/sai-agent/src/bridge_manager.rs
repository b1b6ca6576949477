//! Bridge ports attaching front-panel ports to the default bridge.

use sai_api::attribute::bridge_port;
use sai_store::kinds::{
    BridgePortAdapterHostKey, BridgePortAttributes, BridgePortTraits, PortSaiId, SaiBridgePort,
};
use sai_store::{SaiStore, StoreResult};
use std::sync::Arc;

#[derive(Debug)]
pub struct SaiBridgeManager {
    store: Arc<SaiStore>,
    fdb_learning: bool,
}

impl SaiBridgeManager {
    pub fn new(store: Arc<SaiStore>, fdb_learning: bool) -> Self {
        Self {
            store,
            fdb_learning,
        }
    }

    /// Creates (or reuses) the bridge port of a port.
    pub fn add_bridge_port(&self, port_key: PortSaiId) -> StoreResult<Arc<SaiBridgePort>> {
        let fdb_learning_mode = if self.fdb_learning {
            bridge_port::FDB_LEARNING_MODE_HW
        } else {
            bridge_port::FDB_LEARNING_MODE_DROP
        };
        let attributes = BridgePortAttributes {
            port_id: port_key,
            admin_state: true,
            fdb_learning_mode,
        };
        self.store
            .get::<BridgePortTraits>()
            .set_object(BridgePortAdapterHostKey(port_key), attributes)
    }
}
