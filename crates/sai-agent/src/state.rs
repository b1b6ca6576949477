//! Desired software state and the deltas between two versions of it.
//!
//! A [`SwitchState`] is the complete desired configuration the agent
//! programs into hardware. Reconciliation never looks at a state on its own;
//! it consumes the [`StateDelta`] between the state that is currently applied
//! and the next one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use switch_types::{
    AdminState, LoopbackMode, PortFec, PortId, PortPause, PortSpeed, QueueScheduling, StreamType,
    VlanId,
};

/// Unit a queue rate limit is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    #[default]
    PacketsPerSec,
    KbitsPerSec,
}

/// Minimum and maximum rate of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PortQueueRate {
    #[serde(default)]
    pub unit: RateUnit,
    #[serde(default)]
    pub minimum: u64,
    #[serde(default)]
    pub maximum: u64,
}

/// Egress queue configuration of a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortQueue {
    pub index: u32,
    #[serde(default)]
    pub stream_type: StreamType,
    #[serde(default)]
    pub scheduling: QueueScheduling,
    #[serde(default = "default_queue_weight")]
    pub weight: u32,
    #[serde(default)]
    pub rate: Option<PortQueueRate>,
}

fn default_queue_weight() -> u32 {
    1
}

impl PortQueue {
    /// A unicast queue with default scheduling.
    pub fn unicast(index: u32) -> Self {
        Self {
            index,
            stream_type: StreamType::Unicast,
            scheduling: QueueScheduling::default(),
            weight: default_queue_weight(),
            rate: None,
        }
    }
}

/// Desired configuration of one front-panel port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwPort {
    pub id: PortId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub admin_state: AdminState,
    #[serde(default)]
    pub speed: PortSpeed,
    #[serde(default)]
    pub fec: PortFec,
    #[serde(default)]
    pub pause: PortPause,
    #[serde(default)]
    pub loopback: LoopbackMode,
    #[serde(default)]
    pub ingress_vlan: VlanId,
    #[serde(default)]
    pub queues: Vec<PortQueue>,
}

impl SwPort {
    pub fn new(id: PortId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            admin_state: AdminState::default(),
            speed: PortSpeed::default(),
            fec: PortFec::default(),
            pause: PortPause::default(),
            loopback: LoopbackMode::default(),
            ingress_vlan: VlanId::DEFAULT,
            queues: Vec::new(),
        }
    }
}

/// On-disk form of [`SwitchState`]: ports as a list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SwitchStateFile {
    #[serde(default)]
    ports: Vec<SwPort>,
}

/// The complete desired configuration of the switch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SwitchStateFile", into = "SwitchStateFile")]
pub struct SwitchState {
    ports: BTreeMap<PortId, SwPort>,
}

impl TryFrom<SwitchStateFile> for SwitchState {
    type Error = String;

    fn try_from(file: SwitchStateFile) -> Result<Self, Self::Error> {
        let mut state = SwitchState::new();
        for port in file.ports {
            let id = port.id;
            if state.ports.insert(id, port).is_some() {
                return Err(format!("port {} listed twice", id));
            }
        }
        Ok(state)
    }
}

impl From<SwitchState> for SwitchStateFile {
    fn from(state: SwitchState) -> Self {
        SwitchStateFile {
            ports: state.ports.into_values().collect(),
        }
    }
}

impl SwitchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a port.
    pub fn upsert_port(&mut self, port: SwPort) -> Option<SwPort> {
        self.ports.insert(port.id, port)
    }

    pub fn remove_port(&mut self, id: PortId) -> Option<SwPort> {
        self.ports.remove(&id)
    }

    pub fn port(&self, id: PortId) -> Option<&SwPort> {
        self.ports.get(&id)
    }

    /// Ports in ascending id order.
    pub fn ports(&self) -> impl Iterator<Item = &SwPort> {
        self.ports.values()
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Reads a state file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
            .map_err(|e| anyhow::anyhow!("failed to parse state file {}: {}", path.display(), e))
    }
}

/// One port-level difference between two states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaEntry {
    Added(SwPort),
    Changed { old: SwPort, new: SwPort },
    Removed(SwPort),
}

impl DeltaEntry {
    pub fn port_id(&self) -> PortId {
        match self {
            Self::Added(port) | Self::Removed(port) => port.id,
            Self::Changed { new, .. } => new.id,
        }
    }
}

/// Port differences between two states, ordered by port id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortsDelta {
    entries: Vec<DeltaEntry>,
}

impl PortsDelta {
    fn between(old: &SwitchState, new: &SwitchState) -> Self {
        let mut entries = Vec::new();
        for (id, old_port) in &old.ports {
            match new.ports.get(id) {
                None => entries.push(DeltaEntry::Removed(old_port.clone())),
                Some(new_port) if new_port != old_port => entries.push(DeltaEntry::Changed {
                    old: old_port.clone(),
                    new: new_port.clone(),
                }),
                Some(_) => {}
            }
        }
        for (id, new_port) in &new.ports {
            if !old.ports.contains_key(id) {
                entries.push(DeltaEntry::Added(new_port.clone()));
            }
        }
        entries.sort_by_key(DeltaEntry::port_id);
        Self { entries }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeltaEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn added(&self) -> impl Iterator<Item = &SwPort> {
        self.entries.iter().filter_map(|entry| match entry {
            DeltaEntry::Added(port) => Some(port),
            _ => None,
        })
    }

    pub fn changed(&self) -> impl Iterator<Item = (&SwPort, &SwPort)> {
        self.entries.iter().filter_map(|entry| match entry {
            DeltaEntry::Changed { old, new } => Some((old, new)),
            _ => None,
        })
    }

    pub fn removed(&self) -> impl Iterator<Item = &SwPort> {
        self.entries.iter().filter_map(|entry| match entry {
            DeltaEntry::Removed(port) => Some(port),
            _ => None,
        })
    }
}

/// The difference between the applied state and the next one.
#[derive(Debug, Clone, Default)]
pub struct StateDelta {
    ports: PortsDelta,
}

impl StateDelta {
    pub fn new(old: &SwitchState, new: &SwitchState) -> Self {
        Self {
            ports: PortsDelta::between(old, new),
        }
    }

    pub fn ports_delta(&self) -> &PortsDelta {
        &self.ports
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }
}
