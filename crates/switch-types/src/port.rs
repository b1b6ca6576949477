//! Per-port configuration values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Software identity of a front-panel port.
///
/// Stable across restarts; assigned by the platform mapping, not by hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub u32);

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Port speed in Mbps; the default `0` leaves the adapter's choice in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortSpeed(u32);

impl PortSpeed {
    pub const GE_10: Self = PortSpeed(10_000);
    pub const GE_25: Self = PortSpeed(25_000);
    pub const GE_40: Self = PortSpeed(40_000);
    pub const GE_50: Self = PortSpeed(50_000);
    pub const GE_100: Self = PortSpeed(100_000);

    pub const fn as_mbps(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PortSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => f.write_str("auto"),
            mbps if mbps % 1_000 == 0 => write!(f, "{}G", mbps / 1_000),
            mbps => write!(f, "{mbps}M"),
        }
    }
}

/// Administrative state of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminState {
    /// Default for new ports.
    #[default]
    Disabled,
    Enabled,
}

impl AdminState {
    pub const fn is_enabled(&self) -> bool {
        matches!(self, AdminState::Enabled)
    }
}

/// FEC setting as expressed in the port config (on/off only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortFec {
    #[default]
    Off,
    On,
}

/// Pause frame (802.3x) configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PortPause {
    #[serde(default)]
    pub tx: bool,
    #[serde(default)]
    pub rx: bool,
}

/// Loopback mode requested for a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopbackMode {
    #[default]
    None,
    Phy,
    Mac,
}

/// Transmitter technology of the optics plugged into a port.
///
/// Comes from the platform, not from the port config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransmitterTechnology {
    #[default]
    Unknown,
    Copper,
    Optical,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_speed_display() {
        assert_eq!(PortSpeed::GE_100.to_string(), "100G");
        assert_eq!(PortSpeed::default().to_string(), "auto");
        assert_eq!(serde_json::from_str::<PortSpeed>("2500").unwrap().to_string(), "2500M");
    }

    #[test]
    fn test_port_knobs_from_json() {
        let pause: PortPause = serde_json::from_str("{\"tx\": true}").unwrap();
        assert_eq!(pause, PortPause { tx: true, rx: false });
        let loopback: LoopbackMode = serde_json::from_str("\"phy\"").unwrap();
        assert_eq!(loopback, LoopbackMode::Phy);
        assert!(serde_json::from_str::<PortFec>("\"rs\"").is_err());
    }
}
