//! A single hardware object and its cached state.

use crate::error::{StoreError, StoreResult};
use crate::traits::SaiObjectTraits;
use log::{debug, error, warn};
use parking_lot::RwLock;
use sai_api::{
    SaiApi, SaiApiExt, SaiAttribute, SaiObjectId, SaiOperation, SaiStatId,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Handle to one hardware object of kind `T`.
///
/// Only the owning [`ObjectStore`](crate::ObjectStore) creates objects and
/// changes their attributes. Objects are shared through `Arc`; dropping the
/// last reference removes the object from hardware unless it was released
/// for warm boot or is owned by the adapter.
pub struct SaiObject<T: SaiObjectTraits> {
    api: Arc<dyn SaiApi>,
    adapter_key: SaiObjectId<T>,
    adapter_host_key: T::AdapterHostKey,
    attributes: RwLock<T::CreateAttributes>,
    stats: RwLock<BTreeMap<SaiStatId, u64>>,
    released: AtomicBool,
}

impl<T: SaiObjectTraits> SaiObject<T> {
    /// Creates the object in hardware.
    pub(crate) fn create(
        api: Arc<dyn SaiApi>,
        adapter_host_key: T::AdapterHostKey,
        attributes: T::CreateAttributes,
    ) -> StoreResult<Self> {
        let raw = api
            .create(T::OBJECT_TYPE, &T::to_sai_attributes(&attributes))
            .map_err(|e| StoreError::hardware(T::OBJECT_TYPE, SaiOperation::Create, None, e))?;
        let adapter_key = SaiObjectId::from_raw(raw).ok_or_else(|| {
            StoreError::invariant(T::type_name(), "adapter returned the null object id")
        })?;
        debug!("created {} {:?} as {}", T::type_name(), adapter_host_key, adapter_key);
        Ok(Self::assemble(api, adapter_key, adapter_host_key, attributes))
    }

    /// Rebuilds an existing object from the attributes hardware reports for it.
    pub(crate) fn load(api: Arc<dyn SaiApi>, adapter_key: SaiObjectId<T>) -> StoreResult<Self> {
        let sai_attrs = api
            .get_attributes(T::OBJECT_TYPE, adapter_key.as_raw(), T::ATTRIBUTE_IDS)
            .map_err(|e| StoreError::hardware(T::OBJECT_TYPE, SaiOperation::Get, None, e))?;
        let attributes = T::from_sai_attributes(&sai_attrs)?;
        let adapter_host_key = T::adapter_host_key(&attributes);
        debug!("loaded {} {} as {:?}", T::type_name(), adapter_key, adapter_host_key);
        Ok(Self::assemble(api, adapter_key, adapter_host_key, attributes))
    }

    fn assemble(
        api: Arc<dyn SaiApi>,
        adapter_key: SaiObjectId<T>,
        adapter_host_key: T::AdapterHostKey,
        attributes: T::CreateAttributes,
    ) -> Self {
        Self {
            api,
            adapter_key,
            adapter_host_key,
            attributes: RwLock::new(attributes),
            stats: RwLock::new(BTreeMap::new()),
            released: AtomicBool::new(false),
        }
    }

    pub fn adapter_key(&self) -> SaiObjectId<T> {
        self.adapter_key
    }

    pub fn adapter_host_key(&self) -> &T::AdapterHostKey {
        &self.adapter_host_key
    }

    /// Current attribute values, as last programmed or read back.
    pub fn attributes(&self) -> T::CreateAttributes {
        self.attributes.read().clone()
    }

    /// Programs the differences between the cached and the requested attributes.
    ///
    /// Issues one SAI set per changed attribute and returns how many were set.
    /// If a set fails, the cache keeps the attributes that did reach hardware.
    pub(crate) fn set_attributes(&self, requested: &T::CreateAttributes) -> StoreResult<usize> {
        let mut attributes = self.attributes.write();
        if *attributes == *requested {
            return Ok(0);
        }

        let mut programmed = T::to_sai_attributes(&attributes);
        let mut changed = 0;
        let mut failure = None;
        for attr in T::to_sai_attributes(requested) {
            match programmed.iter_mut().find(|p| p.id == attr.id) {
                Some(current) if current.value == attr.value => continue,
                Some(current) => {
                    if let Err(e) = self.set_one(&attr) {
                        failure = Some(e);
                        break;
                    }
                    *current = attr;
                }
                None => {
                    if let Err(e) = self.set_one(&attr) {
                        failure = Some(e);
                        break;
                    }
                    programmed.push(attr);
                }
            }
            changed += 1;
        }

        match failure {
            None => {
                *attributes = requested.clone();
                debug!(
                    "updated {} {} ({} attributes)",
                    T::type_name(),
                    self.adapter_key,
                    changed
                );
                Ok(changed)
            }
            Some(e) => {
                match T::from_sai_attributes(&programmed) {
                    Ok(partial) => *attributes = partial,
                    Err(decode) => warn!(
                        "cannot rebuild cached attributes of {} {}: {}",
                        T::type_name(),
                        self.adapter_key,
                        decode
                    ),
                }
                Err(e)
            }
        }
    }

    fn set_one(&self, attr: &SaiAttribute) -> StoreResult<()> {
        self.api
            .set_attribute(T::OBJECT_TYPE, self.adapter_key.as_raw(), attr)
            .map_err(|e| StoreError::hardware(T::OBJECT_TYPE, SaiOperation::Set, Some(attr.id), e))
    }

    /// Replaces the cache with values freshly read from hardware.
    pub(crate) fn refresh(&self, attributes: T::CreateAttributes) {
        *self.attributes.write() = attributes;
    }

    /// Reads every counter listed in `T::STATS` from hardware.
    pub fn update_stats(&self) -> StoreResult<()> {
        if T::STATS.is_empty() {
            return Ok(());
        }
        let values = self
            .api
            .get_stats(T::OBJECT_TYPE, self.adapter_key.as_raw(), T::STATS)
            .map_err(|e| StoreError::hardware(T::OBJECT_TYPE, SaiOperation::GetStats, None, e))?;
        let mut stats = self.stats.write();
        for (id, value) in T::STATS.iter().zip(values) {
            stats.insert(*id, value);
        }
        Ok(())
    }

    /// Counters from the last [`update_stats`](Self::update_stats).
    pub fn stats(&self) -> BTreeMap<SaiStatId, u64> {
        self.stats.read().clone()
    }

    /// Leaves the hardware object in place when this handle is dropped.
    pub(crate) fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl<T: SaiObjectTraits> Drop for SaiObject<T> {
    fn drop(&mut self) {
        if T::ADAPTER_OWNED || self.is_released() {
            return;
        }
        match self.api.remove(T::OBJECT_TYPE, self.adapter_key.as_raw()) {
            Ok(()) => debug!(
                "removed {} {:?} ({})",
                T::type_name(),
                self.adapter_host_key,
                self.adapter_key
            ),
            Err(e) => error!(
                "failed to remove {} {:?} ({}): {}",
                T::type_name(),
                self.adapter_host_key,
                self.adapter_key,
                e
            ),
        }
    }
}

impl<T: SaiObjectTraits> fmt::Debug for SaiObject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaiObject")
            .field("adapter_key", &self.adapter_key)
            .field("adapter_host_key", &self.adapter_host_key)
            .field("attributes", &*self.attributes.read())
            .finish()
    }
}
