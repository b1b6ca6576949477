//! Front-panel ports.

use crate::decode::AttrReader;
use crate::error::StoreResult;
use crate::object::SaiObject;
use crate::traits::{SaiObjectTraits, SaiPublisherTraits};
use sai_api::attribute::port;
use sai_api::{SaiAttrId, SaiAttribute, SaiAttributeValue, SaiObjectId, SaiObjectType, SaiStatId};

sai_object_kind!(
    /// SAI port objects.
    PortTraits,
    "port"
);

pub type PortSaiId = SaiObjectId<PortTraits>;
pub type SaiPort = SaiObject<PortTraits>;

/// A port is identified by the hardware lanes it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortAdapterHostKey(pub Vec<u32>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortAttributes {
    pub hw_lane_list: Vec<u32>,
    /// Mbps.
    pub speed: u32,
    pub admin_state: bool,
    pub fec_mode: i32,
    pub internal_loopback_mode: i32,
    pub media_type: i32,
    pub global_flow_control_mode: i32,
    pub port_vlan_id: u16,
}

impl SaiObjectTraits for PortTraits {
    const OBJECT_TYPE: SaiObjectType = SaiObjectType::Port;
    const ATTRIBUTE_IDS: &'static [SaiAttrId] = &[
        port::HW_LANE_LIST,
        port::SPEED,
        port::ADMIN_STATE,
        port::FEC_MODE,
        port::INTERNAL_LOOPBACK_MODE,
        port::MEDIA_TYPE,
        port::GLOBAL_FLOW_CONTROL_MODE,
        port::PORT_VLAN_ID,
    ];
    const STATS: &'static [SaiStatId] = &[
        port::STAT_IF_IN_OCTETS,
        port::STAT_IF_IN_UCAST_PKTS,
        port::STAT_IF_IN_DISCARDS,
        port::STAT_IF_IN_ERRORS,
        port::STAT_IF_OUT_OCTETS,
        port::STAT_IF_OUT_UCAST_PKTS,
        port::STAT_IF_OUT_DISCARDS,
        port::STAT_IF_OUT_ERRORS,
    ];

    type AdapterHostKey = PortAdapterHostKey;
    type CreateAttributes = PortAttributes;

    fn to_sai_attributes(attrs: &PortAttributes) -> Vec<SaiAttribute> {
        vec![
            SaiAttribute::new(
                port::HW_LANE_LIST,
                SaiAttributeValue::U32List(attrs.hw_lane_list.clone()),
            ),
            SaiAttribute::new(port::SPEED, SaiAttributeValue::U32(attrs.speed)),
            SaiAttribute::new(port::ADMIN_STATE, SaiAttributeValue::Bool(attrs.admin_state)),
            SaiAttribute::new(port::FEC_MODE, SaiAttributeValue::I32(attrs.fec_mode)),
            SaiAttribute::new(
                port::INTERNAL_LOOPBACK_MODE,
                SaiAttributeValue::I32(attrs.internal_loopback_mode),
            ),
            SaiAttribute::new(port::MEDIA_TYPE, SaiAttributeValue::I32(attrs.media_type)),
            SaiAttribute::new(
                port::GLOBAL_FLOW_CONTROL_MODE,
                SaiAttributeValue::I32(attrs.global_flow_control_mode),
            ),
            SaiAttribute::new(port::PORT_VLAN_ID, SaiAttributeValue::U16(attrs.port_vlan_id)),
        ]
    }

    fn from_sai_attributes(attrs: &[SaiAttribute]) -> StoreResult<PortAttributes> {
        let r = AttrReader::new(Self::OBJECT_TYPE, attrs);
        Ok(PortAttributes {
            hw_lane_list: r.u32_list(port::HW_LANE_LIST)?,
            speed: r.u32(port::SPEED)?,
            admin_state: r.opt_bool(port::ADMIN_STATE)?.unwrap_or(false),
            fec_mode: r.opt_i32(port::FEC_MODE)?.unwrap_or(port::FEC_MODE_NONE),
            internal_loopback_mode: r
                .opt_i32(port::INTERNAL_LOOPBACK_MODE)?
                .unwrap_or(port::LOOPBACK_NONE),
            media_type: r.opt_i32(port::MEDIA_TYPE)?.unwrap_or(port::MEDIA_TYPE_UNKNOWN),
            global_flow_control_mode: r
                .opt_i32(port::GLOBAL_FLOW_CONTROL_MODE)?
                .unwrap_or(port::FLOW_CONTROL_DISABLE),
            port_vlan_id: r.opt_u16(port::PORT_VLAN_ID)?.unwrap_or(1),
        })
    }

    fn adapter_host_key(attrs: &PortAttributes) -> PortAdapterHostKey {
        PortAdapterHostKey(attrs.hw_lane_list.clone())
    }
}

impl SaiPublisherTraits for PortTraits {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_fill_unreported_attributes() {
        let attrs = vec![
            SaiAttribute::new(port::HW_LANE_LIST, SaiAttributeValue::U32List(vec![4, 5])),
            SaiAttribute::new(port::SPEED, SaiAttributeValue::U32(50_000)),
        ];
        let decoded = PortTraits::from_sai_attributes(&attrs).unwrap();
        assert_eq!(
            decoded,
            PortAttributes {
                hw_lane_list: vec![4, 5],
                speed: 50_000,
                admin_state: false,
                fec_mode: port::FEC_MODE_NONE,
                internal_loopback_mode: port::LOOPBACK_NONE,
                media_type: port::MEDIA_TYPE_UNKNOWN,
                global_flow_control_mode: port::FLOW_CONTROL_DISABLE,
                port_vlan_id: 1,
            }
        );
        assert_eq!(
            PortTraits::adapter_host_key(&decoded),
            PortAdapterHostKey(vec![4, 5])
        );
    }

    #[test]
    fn test_lanes_are_mandatory() {
        let attrs = vec![SaiAttribute::new(port::SPEED, SaiAttributeValue::U32(50_000))];
        assert!(PortTraits::from_sai_attributes(&attrs).is_err());
    }
}
