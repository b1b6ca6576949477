//! Software-side types shared by the switch agent crates.
//!
//! These are the values the desired configuration is expressed in, before
//! any translation into SAI attributes:
//!
//! - [`PortId`], [`PortSpeed`], [`AdminState`] and the other per-port knobs
//! - [`MacAddress`] and [`IpAddress`]
//! - [`VlanId`]: IEEE 802.1Q VLAN identifiers
//! - [`StreamType`] and [`QueueScheduling`] for egress queue configuration

mod ip;
mod mac;
mod port;
mod queue;
mod vlan;

pub use ip::IpAddress;
pub use mac::MacAddress;
pub use port::{AdminState, LoopbackMode, PortFec, PortId, PortPause, PortSpeed, TransmitterTechnology};
pub use queue::{QueueScheduling, StreamType};
pub use vlan::VlanId;

/// VLAN id outside 1..=4094.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid VLAN id {0}: must be 1-4094")]
pub struct InvalidVlanId(pub u16);
