//! Platform port mapping: which hardware lanes a port occupies at each speed.

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use switch_types::{PortId, PortSpeed, TransmitterTechnology};

/// Lanes a port uses when running at one speed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneProfile {
    pub speed: PortSpeed,
    pub lanes: Vec<u32>,
}

/// Platform description of one front-panel port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformPortConfig {
    pub id: PortId,
    #[serde(default)]
    pub transmitter_technology: TransmitterTechnology,
    #[serde(default)]
    pub profiles: Vec<LaneProfile>,
}

impl PlatformPortConfig {
    /// Hardware lanes of the port at `speed`, if the platform supports it.
    pub fn hw_lanes(&self, speed: PortSpeed) -> Option<&[u32]> {
        self.profiles
            .iter()
            .find(|profile| profile.speed == speed)
            .map(|profile| profile.lanes.as_slice())
    }

    pub fn supported_speeds(&self) -> impl Iterator<Item = PortSpeed> + '_ {
        self.profiles.iter().map(|profile| profile.speed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Queues the adapter brings up with every port.
    #[serde(default = "default_queues_per_port")]
    pub queues_per_port: u32,

    #[serde(default)]
    pub ports: Vec<PlatformPortConfig>,
}

fn default_queues_per_port() -> u32 {
    8
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            queues_per_port: default_queues_per_port(),
            ports: Vec::new(),
        }
    }
}

impl PlatformConfig {
    pub fn port(&self, id: PortId) -> Option<&PlatformPortConfig> {
        self.ports.iter().find(|port| port.id == id)
    }

    /// Checks that every port is described once and has usable lanes.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |message: String| Err(ConfigError::Invalid(message));
        let mut seen = std::collections::BTreeSet::new();
        for port in &self.ports {
            if !seen.insert(port.id) {
                return invalid(format!("platform port {} described twice", port.id));
            }
            if port.profiles.is_empty() {
                return invalid(format!("platform port {} has no lane profiles", port.id));
            }
            if let Some(profile) = port.profiles.iter().find(|p| p.lanes.is_empty()) {
                return invalid(format!(
                    "platform port {} has no lanes at {}",
                    port.id, profile.speed
                ));
            }
        }
        Ok(())
    }
}
