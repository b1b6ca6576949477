//! The set of entity managers of one switch.

use crate::config::SwitchSettings;
use crate::error::{ManagerError, ManagerResult};
use crate::indices::ConcurrentIndices;
use crate::platform::PlatformConfig;
use crate::port_manager::SaiPortManager;
use log::info;
use sai_api::{SaiObjectType, SaiOperation};
use sai_store::kinds::{SaiVirtualRouter, VirtualRouterSaiId, VirtualRouterTraits};
use sai_store::{SaiStore, StoreError};
use std::sync::Arc;

#[derive(Debug)]
pub struct SaiManagerTable {
    // Dropped before the virtual router.
    port_manager: SaiPortManager,
    default_virtual_router: Option<Arc<SaiVirtualRouter>>,
}

impl SaiManagerTable {
    pub fn new(
        store: Arc<SaiStore>,
        platform: Arc<PlatformConfig>,
        indices: Arc<ConcurrentIndices>,
        settings: &SwitchSettings,
    ) -> Self {
        Self {
            port_manager: SaiPortManager::new(store, platform, indices, settings.fdb_learning),
            default_virtual_router: None,
        }
    }

    /// Takes the adapter's default virtual router into the store.
    pub fn claim_default_virtual_router(
        &mut self,
        store: &SaiStore,
    ) -> ManagerResult<Arc<SaiVirtualRouter>> {
        let keys = store
            .api()
            .get_object_keys(SaiObjectType::VirtualRouter)
            .map_err(|e| {
                StoreError::hardware(
                    SaiObjectType::VirtualRouter,
                    SaiOperation::GetObjectKeys,
                    None,
                    e,
                )
            })?;
        let key = keys
            .into_iter()
            .filter_map(VirtualRouterSaiId::from_raw)
            .min()
            .ok_or_else(|| ManagerError::platform("adapter reported no virtual router"))?;

        let router = store
            .get::<VirtualRouterTraits>()
            .load_object_owned_by_adapter(key)?;
        info!(
            "default virtual router {} (mac {})",
            key,
            router.attributes().src_mac
        );
        self.default_virtual_router = Some(Arc::clone(&router));
        Ok(router)
    }

    pub fn default_virtual_router(&self) -> Option<&Arc<SaiVirtualRouter>> {
        self.default_virtual_router.as_ref()
    }

    pub fn port_manager(&self) -> &SaiPortManager {
        &self.port_manager
    }

    pub fn port_manager_mut(&mut self) -> &mut SaiPortManager {
        &mut self.port_manager
    }

    /// Drops every handle held by the managers.
    pub fn reset(&mut self) {
        self.port_manager.reset();
        self.default_virtual_router = None;
    }
}
