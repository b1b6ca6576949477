//! Port queues and the schedulers attached to them.
//!
//! Queues are created by the adapter together with their port. The manager
//! only takes them into the store and points each configured queue at a
//! scheduler matching its configuration.

use crate::error::{ManagerError, ManagerResult};
use crate::scheduler_manager::SaiSchedulerManager;
use crate::state::PortQueue;
use log::{debug, warn};
use sai_api::attribute::queue;
use sai_store::kinds::{
    PortSaiId, QueueAttributes, QueueSaiId, QueueTraits, SaiQueue, SaiScheduler, SchedulerTraits,
};
use sai_store::{SaiStore, StoreResult};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use switch_types::StreamType;

/// Identifies a queue within its port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaiQueueConfig {
    pub queue_type: i32,
    pub index: u32,
}

impl SaiQueueConfig {
    pub fn new(stream_type: StreamType, index: u32) -> Self {
        let queue_type = match stream_type {
            StreamType::Unicast => queue::TYPE_UNICAST,
            StreamType::Multicast => queue::TYPE_MULTICAST,
            StreamType::All => queue::TYPE_ALL,
        };
        Self { queue_type, index }
    }

    pub fn of_port_queue(port_queue: &PortQueue) -> Self {
        Self::new(port_queue.stream_type, port_queue.index)
    }

    fn of_attributes(attributes: &QueueAttributes) -> Self {
        Self {
            queue_type: attributes.queue_type,
            index: attributes.index,
        }
    }
}

impl fmt::Display for SaiQueueConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.queue_type {
            queue::TYPE_UNICAST => "UC",
            queue::TYPE_MULTICAST => "MC",
            _ => "ALL",
        };
        write!(f, "{}{}", kind, self.index)
    }
}

#[derive(Debug)]
pub struct SaiQueueHandle {
    pub queue: Arc<SaiQueue>,
    /// Set once the queue has been configured.
    pub scheduler: Option<Arc<SaiScheduler>>,
}

pub type SaiQueueHandles = BTreeMap<SaiQueueConfig, SaiQueueHandle>;

#[derive(Debug)]
pub struct SaiQueueManager {
    store: Arc<SaiStore>,
    scheduler_manager: SaiSchedulerManager,
}

impl SaiQueueManager {
    pub fn new(store: Arc<SaiStore>) -> Self {
        Self {
            scheduler_manager: SaiSchedulerManager::new(Arc::clone(&store)),
            store,
        }
    }

    /// Takes the queues of a port into the store and configures them.
    pub fn load_queues(
        &self,
        port_key: PortSaiId,
        queue_keys: &[QueueSaiId],
        port_queues: &[PortQueue],
    ) -> ManagerResult<SaiQueueHandles> {
        let queue_store = self.store.get::<QueueTraits>();
        let mut handles = SaiQueueHandles::new();
        for &queue_key in queue_keys {
            let queue = queue_store.load_object_owned_by_adapter(queue_key)?;
            let attributes = queue.attributes();
            if attributes.port != port_key {
                warn!(
                    "queue {} reported by port {} belongs to port {}",
                    queue_key, port_key, attributes.port
                );
                continue;
            }
            // Queues configured before a warm boot keep their scheduler.
            let scheduler = attributes.scheduler_profile_id.and_then(|id| {
                self.store
                    .get::<SchedulerTraits>()
                    .iter()
                    .find(|s| s.adapter_key() == id)
            });
            handles.insert(
                SaiQueueConfig::of_attributes(&attributes),
                SaiQueueHandle { queue, scheduler },
            );
        }
        debug!("loaded {} queues of port {}", handles.len(), port_key);

        self.refresh_queues(&mut handles, port_queues)?;
        Ok(handles)
    }

    /// Brings every queue of a port in line with `port_queues`.
    ///
    /// Queues no longer configured are detached from their scheduler.
    pub fn refresh_queues(
        &self,
        handles: &mut SaiQueueHandles,
        port_queues: &[PortQueue],
    ) -> ManagerResult<()> {
        for port_queue in port_queues {
            let config = SaiQueueConfig::of_port_queue(port_queue);
            let handle = handles.get_mut(&config).ok_or_else(|| ManagerError::NotFound {
                kind: "queue",
                id: config.to_string(),
            })?;
            self.change_queue(handle, port_queue)?;
        }

        for (config, handle) in handles.iter_mut() {
            let configured = port_queues
                .iter()
                .any(|q| SaiQueueConfig::of_port_queue(q) == *config);
            if !configured && handle.scheduler.is_some() {
                self.set_scheduler(handle, None)?;
            }
        }
        Ok(())
    }

    /// Points a queue at the scheduler for its new configuration.
    pub fn change_queue(
        &self,
        handle: &mut SaiQueueHandle,
        port_queue: &PortQueue,
    ) -> ManagerResult<()> {
        let scheduler = self.scheduler_manager.create_scheduler(port_queue)?;
        Ok(self.set_scheduler(handle, Some(scheduler))?)
    }

    fn set_scheduler(
        &self,
        handle: &mut SaiQueueHandle,
        scheduler: Option<Arc<SaiScheduler>>,
    ) -> StoreResult<()> {
        let mut attributes = handle.queue.attributes();
        attributes.scheduler_profile_id = scheduler.as_ref().map(|s| s.adapter_key());
        self.store
            .get::<QueueTraits>()
            .set_object(*handle.queue.adapter_host_key(), attributes)?;
        // The previous scheduler goes away here if no other queue uses it.
        handle.scheduler = scheduler;
        Ok(())
    }
}
