//! Per-kind object store.

use crate::error::{StoreError, StoreResult};
use crate::object::SaiObject;
use crate::refmap::RefMap;
use crate::traits::{SaiAdapterOwnedTraits, SaiObjectTraits, SaiPublisherTraits};
use log::{debug, info, warn};
use parking_lot::Mutex;
use sai_api::{
    RawSaiObjectId, SaiApi, SaiApiExt, SaiAttrId, SaiAttribute, SaiObjectId, SaiOperation,
};
use std::sync::Arc;

/// Callback run once for every object a publisher kind creates.
pub type AfterCreateCallback<T> = Arc<dyn Fn(&Arc<SaiObject<T>>) + Send + Sync>;

struct StoreInner<T: SaiObjectTraits> {
    objects: RefMap<T::AdapterHostKey, SaiObject<T>>,
    /// Strong references to reloaded objects until a manager claims them.
    warm_boot_handles: Vec<Arc<SaiObject<T>>>,
    condition: Vec<SaiAttribute>,
}

/// Cache of the live hardware objects of one kind, keyed by adapter host key.
///
/// At most one live object exists per host key. The store holds objects
/// weakly; whoever asked for an object owns it, and the hardware object goes
/// away with its last owner.
pub struct ObjectStore<T: SaiObjectTraits> {
    api: Arc<dyn SaiApi>,
    inner: Mutex<StoreInner<T>>,
    subscribers: Mutex<Vec<AfterCreateCallback<T>>>,
}

impl<T: SaiObjectTraits> ObjectStore<T> {
    pub fn new(api: Arc<dyn SaiApi>) -> Self {
        Self {
            api,
            inner: Mutex::new(StoreInner {
                objects: RefMap::new(),
                warm_boot_handles: Vec::new(),
                condition: T::condition_attributes(),
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Creates or updates the object identified by `host_key`.
    ///
    /// A new key creates the hardware object and notifies creation
    /// subscribers. A known key updates the existing object in place,
    /// programming only the attributes that changed.
    pub fn set_object(
        &self,
        host_key: T::AdapterHostKey,
        attributes: T::CreateAttributes,
    ) -> StoreResult<Arc<SaiObject<T>>> {
        let created = {
            let mut inner = self.inner.lock();
            if let Some(existing) = inner.objects.get(&host_key) {
                existing.set_attributes(&attributes)?;
                return Ok(existing);
            }
            let object = Arc::new(SaiObject::create(
                Arc::clone(&self.api),
                host_key.clone(),
                attributes,
            )?);
            inner.objects.insert(host_key, &object);
            object
        };
        self.notify_after_create(&created);
        Ok(created)
    }

    /// Looks up the live object for `host_key`.
    pub fn get(&self, host_key: &T::AdapterHostKey) -> Option<Arc<SaiObject<T>>> {
        self.inner.lock().objects.get(host_key)
    }

    /// Rebuilds the store from hardware.
    ///
    /// With `snapshot_keys` only those adapter keys are considered, otherwise
    /// every object of the kind's SAI type is enumerated. Objects whose
    /// condition attributes differ from the configured condition belong to
    /// another kind and are skipped. Two objects with one host key are an
    /// invariant violation.
    pub fn reload(&self, snapshot_keys: Option<&[RawSaiObjectId]>) -> StoreResult<()> {
        let keys = match snapshot_keys {
            Some(keys) => keys.to_vec(),
            None => self.api.get_object_keys(T::OBJECT_TYPE).map_err(|e| {
                StoreError::hardware(T::OBJECT_TYPE, SaiOperation::GetObjectKeys, None, e)
            })?,
        };

        let mut inner = self.inner.lock();
        let condition = inner.condition.clone();
        let mut loaded = 0;
        for raw in keys {
            let Some(adapter_key) = SaiObjectId::<T>::from_raw(raw) else {
                warn!("skipping null {} adapter key", T::type_name());
                continue;
            };
            if !self.matches_condition(raw, &condition)? {
                debug!("{} 0x{:016x} does not match condition", T::type_name(), raw);
                continue;
            }

            let object = SaiObject::load(Arc::clone(&self.api), adapter_key)?;
            if let Some(existing) = inner.objects.get(object.adapter_host_key()) {
                object.release();
                if existing.adapter_key() == adapter_key {
                    continue;
                }
                return Err(StoreError::invariant(
                    T::type_name(),
                    format!(
                        "{} and {} share host key {:?}",
                        existing.adapter_key(),
                        adapter_key,
                        existing.adapter_host_key()
                    ),
                ));
            }

            let object = Arc::new(object);
            inner
                .objects
                .insert(object.adapter_host_key().clone(), &object);
            inner.warm_boot_handles.push(object);
            loaded += 1;
        }
        info!("reloaded {} {} objects", loaded, T::type_name());
        Ok(())
    }

    fn matches_condition(
        &self,
        raw: RawSaiObjectId,
        condition: &[SaiAttribute],
    ) -> StoreResult<bool> {
        if condition.is_empty() {
            return Ok(true);
        }
        let ids: Vec<SaiAttrId> = condition.iter().map(|a| a.id).collect();
        let actual = self
            .api
            .get_attributes(T::OBJECT_TYPE, raw, &ids)
            .map_err(|e| StoreError::hardware(T::OBJECT_TYPE, SaiOperation::Get, None, e))?;
        Ok(actual == condition)
    }

    /// Drops every cache entry and warm-boot handle.
    ///
    /// Objects nobody else holds are removed from hardware.
    pub fn release(&self) {
        let (objects, handles) = {
            let mut inner = self.inner.lock();
            (
                inner.objects.drain(),
                std::mem::take(&mut inner.warm_boot_handles),
            )
        };
        debug!(
            "releasing {} {} objects",
            objects.len(),
            T::type_name()
        );
        drop(handles);
        drop(objects);
    }

    /// Drops the warm-boot handles of reloaded objects that no manager claimed.
    ///
    /// Returns how many of those objects went away with it.
    pub fn release_unclaimed(&self) -> usize {
        let handles = std::mem::take(&mut self.inner.lock().warm_boot_handles);
        let unclaimed = handles
            .iter()
            .filter(|h| Arc::strong_count(h) == 1)
            .count();
        if unclaimed > 0 {
            info!(
                "releasing {} unclaimed {} objects",
                unclaimed,
                T::type_name()
            );
        }
        drop(handles);
        unclaimed
    }

    /// Forgets every object while leaving it programmed in hardware.
    pub fn exit_for_warm_boot(&self) {
        let (objects, handles) = {
            let mut inner = self.inner.lock();
            let objects = inner.objects.drain();
            for object in &objects {
                object.release();
            }
            (objects, std::mem::take(&mut inner.warm_boot_handles))
        };
        info!(
            "{}: left {} objects in hardware for warm boot",
            T::type_name(),
            objects.len()
        );
        drop(handles);
        drop(objects);
    }

    /// Adapter keys of all live objects, ascending.
    pub fn snapshot(&self) -> Vec<RawSaiObjectId> {
        let mut keys: Vec<RawSaiObjectId> = self
            .inner
            .lock()
            .objects
            .iter()
            .map(|(_, object)| object.adapter_key().as_raw())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Replaces the condition `reload` filters on.
    pub fn set_condition_attributes(&self, condition: Vec<SaiAttribute>) {
        self.inner.lock().condition = condition;
    }

    pub fn len(&self) -> usize {
        self.inner.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live objects, in no particular order.
    pub fn iter(&self) -> std::vec::IntoIter<Arc<SaiObject<T>>> {
        let objects: Vec<_> = self
            .inner
            .lock()
            .objects
            .iter()
            .map(|(_, object)| object)
            .collect();
        objects.into_iter()
    }

    fn notify_after_create(&self, object: &Arc<SaiObject<T>>) {
        let subscribers = self.subscribers.lock().clone();
        for callback in subscribers {
            callback(object);
        }
    }
}

impl<T: SaiAdapterOwnedTraits> ObjectStore<T> {
    /// Takes an object the adapter created on its own into the store.
    ///
    /// The host key is derived from the attributes hardware reports. Loading
    /// an object already in the store refreshes its cached attributes.
    pub fn load_object_owned_by_adapter(
        &self,
        adapter_key: SaiObjectId<T>,
    ) -> StoreResult<Arc<SaiObject<T>>> {
        let loaded = SaiObject::load(Arc::clone(&self.api), adapter_key)?;
        let mut inner = self.inner.lock();
        if let Some(existing) = inner.objects.get(loaded.adapter_host_key()) {
            loaded.release();
            if existing.adapter_key() != adapter_key {
                return Err(StoreError::invariant(
                    T::type_name(),
                    format!(
                        "{} and {} share host key {:?}",
                        existing.adapter_key(),
                        adapter_key,
                        existing.adapter_host_key()
                    ),
                ));
            }
            existing.refresh(loaded.attributes());
            return Ok(existing);
        }

        let object = Arc::new(loaded);
        inner
            .objects
            .insert(object.adapter_host_key().clone(), &object);
        Ok(object)
    }
}

impl<T: SaiPublisherTraits> ObjectStore<T> {
    /// Registers a callback run after every object creation.
    ///
    /// Callbacks run after the store lock is released and may call back
    /// into the store.
    pub fn subscribe_after_create<F>(&self, callback: F)
    where
        F: Fn(&Arc<SaiObject<T>>) + Send + Sync + 'static,
    {
        self.subscribers.lock().push(Arc::new(callback));
    }
}
