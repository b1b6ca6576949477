//! Port ingress VLAN.

use crate::InvalidVlanId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 802.1Q VLAN id in the usable range 1..=4094.
///
/// ```
/// use switch_types::VlanId;
///
/// assert_eq!(VlanId::new(100).unwrap().as_u16(), 100);
/// assert!(VlanId::new(4095).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    /// Ingress VLAN of ports that do not set one.
    pub const DEFAULT: VlanId = VlanId(1);

    pub const fn new(id: u16) -> Result<Self, InvalidVlanId> {
        match id {
            1..=4094 => Ok(VlanId(id)),
            _ => Err(InvalidVlanId(id)),
        }
    }

    pub const fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Default for VlanId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = InvalidVlanId;

    fn try_from(id: u16) -> Result<Self, Self::Error> {
        VlanId::new(id)
    }
}

impl From<VlanId> for u16 {
    fn from(vlan: VlanId) -> u16 {
        vlan.0
    }
}
