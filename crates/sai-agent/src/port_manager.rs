//! SaiPortManager - reconciles software ports into SAI ports.
//!
//! For every software port the manager owns one [`SaiPortHandle`] holding the
//! hardware port, its bridge port and its queues. Handles are created on
//! "added" deltas, updated in place on "changed" deltas and dropped on
//! "removed" deltas; dropping a handle releases the objects it holds, which
//! removes them from hardware once nothing else references them.
//!
//! A port is identified in hardware by its lanes. A change that would move a
//! port to different lanes is rejected; the port has to be removed and added
//! again.

use crate::bridge_manager::SaiBridgeManager;
use crate::error::{ManagerError, ManagerResult};
use crate::indices::ConcurrentIndices;
use crate::platform::PlatformConfig;
use crate::queue_manager::{SaiQueueConfig, SaiQueueHandle, SaiQueueHandles, SaiQueueManager};
use crate::state::{DeltaEntry, PortQueue, PortsDelta, SwPort};
use log::{debug, info};
use sai_api::attribute::{port, queue};
use sai_api::{SaiApiExt, SaiObjectType, SaiOperation};
use sai_store::kinds::{
    PortAdapterHostKey, PortAttributes, PortSaiId, PortTraits, QueueSaiId, SaiBridgePort, SaiPort,
};
use sai_store::{SaiStore, StoreError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use switch_types::{LoopbackMode, PortFec, PortId, PortPause, TransmitterTechnology};

/// Maps pause configuration to the SAI flow control mode.
pub fn sai_port_pause_mode(pause: PortPause) -> i32 {
    match (pause.tx, pause.rx) {
        (true, true) => port::FLOW_CONTROL_BOTH_ENABLE,
        (true, false) => port::FLOW_CONTROL_TX_ONLY,
        (false, true) => port::FLOW_CONTROL_RX_ONLY,
        (false, false) => port::FLOW_CONTROL_DISABLE,
    }
}

pub fn sai_port_loopback_mode(mode: LoopbackMode) -> i32 {
    match mode {
        LoopbackMode::None => port::LOOPBACK_NONE,
        LoopbackMode::Phy => port::LOOPBACK_PHY,
        LoopbackMode::Mac => port::LOOPBACK_MAC,
    }
}

pub fn sai_port_media_type(technology: TransmitterTechnology) -> i32 {
    match technology {
        TransmitterTechnology::Copper => port::MEDIA_TYPE_COPPER,
        TransmitterTechnology::Optical => port::MEDIA_TYPE_FIBER,
        TransmitterTechnology::Unknown => port::MEDIA_TYPE_UNKNOWN,
    }
}

/// Counters of one port as of the last collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HwPortStats {
    pub in_bytes: u64,
    pub in_unicast_pkts: u64,
    pub in_discards: u64,
    pub in_errors: u64,
    pub out_bytes: u64,
    pub out_unicast_pkts: u64,
    pub out_discards: u64,
    pub out_errors: u64,
    /// Unicast queue index to transmitted bytes.
    pub queue_out_bytes: BTreeMap<u32, u64>,
    /// Unicast queue index to dropped packets.
    pub queue_out_discard_packets: BTreeMap<u32, u64>,
}

impl HwPortStats {
    fn collect(sai_port: &SaiPort, queues: &SaiQueueHandles) -> Self {
        let counters = sai_port.stats();
        let read = |id| counters.get(&id).copied().unwrap_or(0);
        let mut stats = HwPortStats {
            in_bytes: read(port::STAT_IF_IN_OCTETS),
            in_unicast_pkts: read(port::STAT_IF_IN_UCAST_PKTS),
            in_discards: read(port::STAT_IF_IN_DISCARDS),
            in_errors: read(port::STAT_IF_IN_ERRORS),
            out_bytes: read(port::STAT_IF_OUT_OCTETS),
            out_unicast_pkts: read(port::STAT_IF_OUT_UCAST_PKTS),
            out_discards: read(port::STAT_IF_OUT_DISCARDS),
            out_errors: read(port::STAT_IF_OUT_ERRORS),
            ..Default::default()
        };
        for (config, handle) in queues {
            if config.queue_type != queue::TYPE_UNICAST {
                continue;
            }
            let counters = handle.queue.stats();
            let read = |id| counters.get(&id).copied().unwrap_or(0);
            stats
                .queue_out_bytes
                .insert(config.index, read(queue::STAT_BYTES));
            stats
                .queue_out_discard_packets
                .insert(config.index, read(queue::STAT_DROPPED_PACKETS));
        }
        stats
    }
}

/// Hardware objects backing one software port.
#[derive(Debug)]
pub struct SaiPortHandle {
    // Fields drop in declaration order: dependents before the port.
    pub queues: SaiQueueHandles,
    pub bridge_port: Arc<SaiBridgePort>,
    pub port: Arc<SaiPort>,
    pub last_collected_stats: HwPortStats,
}

/// Callbacks for port lifecycle events.
#[derive(Clone, Default)]
pub struct SaiPortManagerCallbacks {
    /// Called after a port and its dependents are programmed.
    pub on_port_added: Option<Arc<dyn Fn(PortId, PortSaiId) + Send + Sync>>,
    /// Called after a port's handle is dropped.
    pub on_port_removed: Option<Arc<dyn Fn(PortId) + Send + Sync>>,
}

impl std::fmt::Debug for SaiPortManagerCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaiPortManagerCallbacks")
            .field("on_port_added", &self.on_port_added.is_some())
            .field("on_port_removed", &self.on_port_removed.is_some())
            .finish()
    }
}

/// Statistics for port reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortManagerStats {
    pub ports_added: u64,
    pub ports_changed: u64,
    pub ports_removed: u64,
    pub queue_changes: u64,
    pub stats_collections: u64,
}

#[derive(Debug)]
pub struct SaiPortManager {
    store: Arc<SaiStore>,
    platform: Arc<PlatformConfig>,
    indices: Arc<ConcurrentIndices>,
    bridge_manager: SaiBridgeManager,
    queue_manager: SaiQueueManager,
    handles: BTreeMap<PortId, SaiPortHandle>,
    callbacks: SaiPortManagerCallbacks,
    stats: PortManagerStats,
}

impl SaiPortManager {
    pub fn new(
        store: Arc<SaiStore>,
        platform: Arc<PlatformConfig>,
        indices: Arc<ConcurrentIndices>,
        fdb_learning: bool,
    ) -> Self {
        Self {
            bridge_manager: SaiBridgeManager::new(Arc::clone(&store), fdb_learning),
            queue_manager: SaiQueueManager::new(Arc::clone(&store)),
            store,
            platform,
            indices,
            handles: BTreeMap::new(),
            callbacks: SaiPortManagerCallbacks::default(),
            stats: PortManagerStats::default(),
        }
    }

    pub fn set_callbacks(&mut self, callbacks: SaiPortManagerCallbacks) {
        self.callbacks = callbacks;
    }

    /// Programs a new port with its bridge port and queues.
    pub fn add_port(&mut self, sw_port: &SwPort) -> ManagerResult<PortSaiId> {
        if self.handles.contains_key(&sw_port.id) {
            return Err(ManagerError::AlreadyExists(sw_port.id));
        }
        let attributes = self.attributes_from_sw_port(sw_port)?;
        let port_key = PortAdapterHostKey(attributes.hw_lane_list.clone());

        let port = self
            .store
            .get::<PortTraits>()
            .set_object(port_key, attributes)?;
        let bridge_port = self.bridge_manager.add_bridge_port(port.adapter_key())?;
        let queues = self.load_queues(sw_port, &port)?;

        let port_sai_id = port.adapter_key();
        self.handles.insert(
            sw_port.id,
            SaiPortHandle {
                queues,
                bridge_port,
                port,
                last_collected_stats: HwPortStats::default(),
            },
        );
        self.indices.insert_port(port_sai_id, sw_port.id);
        self.stats.ports_added += 1;
        info!("added port {} as {}", sw_port.id, port_sai_id);

        if let Some(on_added) = &self.callbacks.on_port_added {
            on_added(sw_port.id, port_sai_id);
        }
        Ok(port_sai_id)
    }

    /// Drops a port's handle, removing its hardware objects.
    pub fn remove_port(&mut self, id: PortId) -> ManagerResult<()> {
        let handle = self
            .handles
            .remove(&id)
            .ok_or_else(|| ManagerError::port_not_found(id))?;
        // Readers must not find the port once its removal starts.
        self.indices.erase_port(handle.port.adapter_key());
        drop(handle);

        self.stats.ports_removed += 1;
        info!("removed port {}", id);
        if let Some(on_removed) = &self.callbacks.on_port_removed {
            on_removed(id);
        }
        Ok(())
    }

    /// Updates a port in place.
    pub fn change_port(&mut self, old: &SwPort, new: &SwPort) -> ManagerResult<()> {
        if !self.handles.contains_key(&new.id) {
            return Err(ManagerError::port_not_found(new.id));
        }
        let attributes = self.attributes_from_sw_port(new)?;
        let handle = self
            .handles
            .get_mut(&new.id)
            .ok_or_else(|| ManagerError::port_not_found(new.id))?;

        let current = handle.port.adapter_host_key();
        if current.0 != attributes.hw_lane_list {
            return Err(ManagerError::IdentityChanged {
                port: new.id,
                old: current.0.clone(),
                new: attributes.hw_lane_list,
            });
        }
        let port_key = current.clone();
        self.store
            .get::<PortTraits>()
            .set_object(port_key, attributes)?;

        if old.queues != new.queues {
            self.queue_manager
                .refresh_queues(&mut handle.queues, &new.queues)?;
            self.stats.queue_changes += 1;
        }
        self.stats.ports_changed += 1;
        debug!("changed port {}", new.id);
        Ok(())
    }

    /// Applies removed, changed and added ports, in that order.
    pub fn process_port_delta(&mut self, delta: &PortsDelta) -> ManagerResult<()> {
        self.process_port_delta_with(delta, |_| {})
    }

    /// Like [`process_port_delta`](Self::process_port_delta), reporting each
    /// entry once it is programmed.
    ///
    /// On error, the entries reported so far are in hardware and the rest
    /// are not.
    pub fn process_port_delta_with<F>(
        &mut self,
        delta: &PortsDelta,
        mut on_applied: F,
    ) -> ManagerResult<()>
    where
        F: FnMut(&DeltaEntry),
    {
        let removed = delta.iter().filter(|e| matches!(e, DeltaEntry::Removed(_)));
        let changed = delta.iter().filter(|e| matches!(e, DeltaEntry::Changed { .. }));
        let added = delta.iter().filter(|e| matches!(e, DeltaEntry::Added(_)));
        for entry in removed.chain(changed).chain(added) {
            match entry {
                DeltaEntry::Removed(old) => self.remove_port(old.id)?,
                DeltaEntry::Changed { old, new } => self.change_port(old, new)?,
                DeltaEntry::Added(new) => {
                    self.add_port(new)?;
                }
            }
            on_applied(entry);
        }
        Ok(())
    }

    /// Derives SAI port attributes from a software port and the platform mapping.
    pub fn attributes_from_sw_port(&self, sw_port: &SwPort) -> ManagerResult<PortAttributes> {
        let platform_port = self.platform.port(sw_port.id).ok_or_else(|| {
            ManagerError::platform(format!("no platform mapping for port {}", sw_port.id))
        })?;
        let hw_lane_list = platform_port.hw_lanes(sw_port.speed).ok_or_else(|| {
            let supported: Vec<String> = platform_port
                .supported_speeds()
                .map(|speed| speed.to_string())
                .collect();
            ManagerError::platform(format!(
                "port {} has no lanes for speed {} (supported: {})",
                sw_port.id,
                sw_port.speed,
                supported.join(", ")
            ))
        })?;
        let fec_mode = match sw_port.fec {
            PortFec::On => port::FEC_MODE_RS,
            PortFec::Off => port::FEC_MODE_NONE,
        };

        Ok(PortAttributes {
            hw_lane_list: hw_lane_list.to_vec(),
            speed: sw_port.speed.as_mbps(),
            admin_state: sw_port.admin_state.is_enabled(),
            fec_mode,
            internal_loopback_mode: sai_port_loopback_mode(sw_port.loopback),
            media_type: sai_port_media_type(platform_port.transmitter_technology),
            global_flow_control_mode: sai_port_pause_mode(sw_port.pause),
            port_vlan_id: sw_port.ingress_vlan.as_u16(),
        })
    }

    fn load_queues(&self, sw_port: &SwPort, sai_port: &SaiPort) -> ManagerResult<SaiQueueHandles> {
        let queue_list = self
            .store
            .api()
            .get_typed(SaiObjectType::Port, sai_port.adapter_key(), port::QOS_QUEUE_LIST)
            .map_err(|e| {
                StoreError::hardware(
                    SaiObjectType::Port,
                    SaiOperation::Get,
                    Some(port::QOS_QUEUE_LIST),
                    e,
                )
            })?;
        let queue_keys: Vec<QueueSaiId> = queue_list
            .as_object_list()
            .ok_or(StoreError::InvalidAttribute {
                object_type: SaiObjectType::Port,
                attribute: port::QOS_QUEUE_LIST,
                reason: "unexpected value type",
            })?
            .iter()
            .filter_map(|&raw| QueueSaiId::from_raw(raw))
            .collect();
        if queue_keys.is_empty() {
            return Err(ManagerError::NotFound {
                kind: "queues of port",
                id: sw_port.id.to_string(),
            });
        }
        self.queue_manager
            .load_queues(sai_port.adapter_key(), &queue_keys, &sw_port.queues)
    }

    pub fn get_port_handle(&self, id: PortId) -> Option<&SaiPortHandle> {
        self.handles.get(&id)
    }

    pub fn get_queue_handle(&self, id: PortId, config: &SaiQueueConfig) -> Option<&SaiQueueHandle> {
        self.handles.get(&id)?.queues.get(config)
    }

    /// Reconfigures one queue of a port.
    pub fn change_queue(&mut self, id: PortId, port_queue: &PortQueue) -> ManagerResult<()> {
        let handle = self
            .handles
            .get_mut(&id)
            .ok_or_else(|| ManagerError::port_not_found(id))?;
        let config = SaiQueueConfig::of_port_queue(port_queue);
        let queue = handle
            .queues
            .get_mut(&config)
            .ok_or_else(|| ManagerError::NotFound {
                kind: "queue",
                id: format!("{} of port {}", config, id),
            })?;
        self.queue_manager.change_queue(queue, port_queue)?;
        self.stats.queue_changes += 1;
        Ok(())
    }

    /// Collects port and queue counters from hardware.
    pub fn update_stats(&mut self) -> ManagerResult<()> {
        for handle in self.handles.values_mut() {
            handle.port.update_stats()?;
            for queue in handle.queues.values() {
                queue.queue.update_stats()?;
            }
            handle.last_collected_stats = HwPortStats::collect(&handle.port, &handle.queues);
        }
        self.stats.stats_collections += 1;
        Ok(())
    }

    /// Counters of every port as of the last [`update_stats`](Self::update_stats).
    pub fn get_port_stats(&self) -> BTreeMap<PortId, HwPortStats> {
        self.handles
            .iter()
            .map(|(id, handle)| (*id, handle.last_collected_stats.clone()))
            .collect()
    }

    pub fn port_count(&self) -> usize {
        self.handles.len()
    }

    pub fn stats(&self) -> &PortManagerStats {
        &self.stats
    }

    /// Drops every handle, erasing index entries first.
    pub fn reset(&mut self) {
        for handle in self.handles.values() {
            self.indices.erase_port(handle.port.adapter_key());
        }
        self.handles.clear();
    }
}
