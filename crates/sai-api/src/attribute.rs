//! SAI attribute values and the attribute / enum ids used by this control plane.

use crate::types::RawSaiObjectId;
use std::fmt;
use switch_types::{IpAddress, MacAddress};

/// Attribute id within one object type (`sai_attr_id_t`).
pub type SaiAttrId = u32;

/// Counter id within one object type (`sai_stat_id_t`).
pub type SaiStatId = u32;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SaiAttributeValue {
    Bool(bool),
    U16(u16),
    U32(u32),
    U64(u64),
    I32(i32),
    Mac(MacAddress),
    Ip(IpAddress),
    ObjectId(RawSaiObjectId),
    U32List(Vec<u32>),
    ObjectList(Vec<RawSaiObjectId>),
}

impl SaiAttributeValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Self::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_mac(&self) -> Option<MacAddress> {
        match self {
            Self::Mac(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_ip(&self) -> Option<IpAddress> {
        match self {
            Self::Ip(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_object_id(&self) -> Option<RawSaiObjectId> {
        match self {
            Self::ObjectId(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32_list(&self) -> Option<&[u32]> {
        match self {
            Self::U32List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object_list(&self) -> Option<&[RawSaiObjectId]> {
        match self {
            Self::ObjectList(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for SaiAttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::Mac(v) => write!(f, "{v}"),
            Self::Ip(v) => write!(f, "{v}"),
            Self::ObjectId(v) => write!(f, "0x{v:016x}"),
            Self::U32List(v) => write!(f, "{v:?}"),
            Self::ObjectList(v) => {
                let ids: Vec<String> = v.iter().map(|id| format!("0x{id:016x}")).collect();
                write!(f, "[{}]", ids.join(", "))
            }
        }
    }
}

/// An attribute id paired with its value (`sai_attribute_t`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaiAttribute {
    pub id: SaiAttrId,
    pub value: SaiAttributeValue,
}

impl SaiAttribute {
    pub fn new(id: SaiAttrId, value: SaiAttributeValue) -> Self {
        Self { id, value }
    }
}

/// Finds an attribute by id in a list.
pub fn find_attribute(attrs: &[SaiAttribute], id: SaiAttrId) -> Option<&SaiAttributeValue> {
    attrs.iter().find(|a| a.id == id).map(|a| &a.value)
}

pub mod port {
    use super::{SaiAttrId, SaiStatId};

    pub const HW_LANE_LIST: SaiAttrId = 0;
    pub const SPEED: SaiAttrId = 1;
    pub const ADMIN_STATE: SaiAttrId = 2;
    pub const FEC_MODE: SaiAttrId = 3;
    pub const INTERNAL_LOOPBACK_MODE: SaiAttrId = 4;
    pub const MEDIA_TYPE: SaiAttrId = 5;
    pub const GLOBAL_FLOW_CONTROL_MODE: SaiAttrId = 6;
    pub const PORT_VLAN_ID: SaiAttrId = 7;
    /// Read only.
    pub const QOS_NUMBER_OF_QUEUES: SaiAttrId = 8;
    /// Read only.
    pub const QOS_QUEUE_LIST: SaiAttrId = 9;

    pub const FEC_MODE_NONE: i32 = 0;
    pub const FEC_MODE_RS: i32 = 1;

    pub const FLOW_CONTROL_DISABLE: i32 = 0;
    pub const FLOW_CONTROL_TX_ONLY: i32 = 1;
    pub const FLOW_CONTROL_RX_ONLY: i32 = 2;
    pub const FLOW_CONTROL_BOTH_ENABLE: i32 = 3;

    pub const LOOPBACK_NONE: i32 = 0;
    pub const LOOPBACK_PHY: i32 = 1;
    pub const LOOPBACK_MAC: i32 = 2;

    pub const MEDIA_TYPE_UNKNOWN: i32 = 0;
    pub const MEDIA_TYPE_FIBER: i32 = 1;
    pub const MEDIA_TYPE_COPPER: i32 = 2;

    pub const STAT_IF_IN_OCTETS: SaiStatId = 0;
    pub const STAT_IF_IN_UCAST_PKTS: SaiStatId = 1;
    pub const STAT_IF_IN_DISCARDS: SaiStatId = 4;
    pub const STAT_IF_IN_ERRORS: SaiStatId = 5;
    pub const STAT_IF_OUT_OCTETS: SaiStatId = 9;
    pub const STAT_IF_OUT_UCAST_PKTS: SaiStatId = 10;
    pub const STAT_IF_OUT_DISCARDS: SaiStatId = 13;
    pub const STAT_IF_OUT_ERRORS: SaiStatId = 14;
}

pub mod bridge_port {
    use super::SaiAttrId;

    pub const TYPE: SaiAttrId = 0;
    pub const PORT_ID: SaiAttrId = 1;
    pub const ADMIN_STATE: SaiAttrId = 2;
    pub const FDB_LEARNING_MODE: SaiAttrId = 3;

    pub const TYPE_PORT: i32 = 0;

    pub const FDB_LEARNING_MODE_DROP: i32 = 0;
    pub const FDB_LEARNING_MODE_HW: i32 = 2;
}

pub mod queue {
    use super::{SaiAttrId, SaiStatId};

    pub const TYPE: SaiAttrId = 0;
    pub const PORT: SaiAttrId = 1;
    pub const INDEX: SaiAttrId = 2;
    pub const PARENT_SCHEDULER_NODE: SaiAttrId = 3;
    pub const SCHEDULER_PROFILE_ID: SaiAttrId = 5;

    pub const TYPE_ALL: i32 = 0;
    pub const TYPE_UNICAST: i32 = 1;
    pub const TYPE_MULTICAST: i32 = 2;

    pub const STAT_PACKETS: SaiStatId = 0;
    pub const STAT_BYTES: SaiStatId = 1;
    pub const STAT_DROPPED_PACKETS: SaiStatId = 2;
    pub const STAT_DROPPED_BYTES: SaiStatId = 3;
}

pub mod scheduler {
    use super::SaiAttrId;

    pub const SCHEDULING_TYPE: SaiAttrId = 0;
    pub const SCHEDULING_WEIGHT: SaiAttrId = 1;
    pub const METER_TYPE: SaiAttrId = 2;
    pub const MIN_BANDWIDTH_RATE: SaiAttrId = 3;
    pub const MAX_BANDWIDTH_RATE: SaiAttrId = 5;

    pub const TYPE_STRICT: i32 = 0;
    pub const TYPE_WRR: i32 = 1;
    pub const TYPE_DWRR: i32 = 2;

    pub const METER_TYPE_PACKETS: i32 = 0;
    pub const METER_TYPE_BYTES: i32 = 1;
}

pub mod virtual_router {
    use super::SaiAttrId;

    pub const SRC_MAC_ADDRESS: SaiAttrId = 2;
}

pub mod router_interface {
    use super::SaiAttrId;

    pub const VIRTUAL_ROUTER_ID: SaiAttrId = 0;
    pub const TYPE: SaiAttrId = 1;
    pub const VLAN_ID: SaiAttrId = 3;
    pub const SRC_MAC_ADDRESS: SaiAttrId = 5;
    pub const MTU: SaiAttrId = 9;

    pub const TYPE_PORT: i32 = 0;
    pub const TYPE_VLAN: i32 = 1;
}

pub mod next_hop {
    use super::SaiAttrId;

    pub const TYPE: SaiAttrId = 0;
    pub const IP: SaiAttrId = 1;
    pub const ROUTER_INTERFACE_ID: SaiAttrId = 2;
    pub const LABELSTACK: SaiAttrId = 5;

    pub const TYPE_IP: i32 = 0;
    pub const TYPE_MPLS: i32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_accessors() {
        let value = SaiAttributeValue::U32List(vec![1, 2, 3, 4]);
        assert_eq!(value.as_u32_list(), Some(&[1, 2, 3, 4][..]));
        assert_eq!(value.as_u32(), None);
        assert_eq!(SaiAttributeValue::I32(-1).as_i32(), Some(-1));
    }

    #[test]
    fn test_find_attribute() {
        let attrs = vec![
            SaiAttribute::new(port::SPEED, SaiAttributeValue::U32(100_000)),
            SaiAttribute::new(port::ADMIN_STATE, SaiAttributeValue::Bool(true)),
        ];
        assert_eq!(
            find_attribute(&attrs, port::ADMIN_STATE),
            Some(&SaiAttributeValue::Bool(true))
        );
        assert!(find_attribute(&attrs, port::FEC_MODE).is_none());
    }

    #[test]
    fn test_display_object_list() {
        let value = SaiAttributeValue::ObjectList(vec![1, 0x15]);
        assert_eq!(
            value.to_string(),
            "[0x0000000000000001, 0x0000000000000015]"
        );
    }
}
