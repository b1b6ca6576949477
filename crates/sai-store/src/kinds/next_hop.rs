//! IP and MPLS next hops.
//!
//! Both kinds live under the NEXT_HOP object type. Which kind an object
//! enumerated from hardware belongs to is decided by its TYPE attribute.

use crate::decode::AttrReader;
use crate::error::StoreResult;
use crate::kinds::router_interface::RouterInterfaceSaiId;
use crate::object::SaiObject;
use crate::traits::SaiObjectTraits;
use sai_api::attribute::next_hop;
use sai_api::{SaiAttrId, SaiAttribute, SaiAttributeValue, SaiObjectId, SaiObjectType};
use switch_types::IpAddress;

sai_object_kind!(IpNextHopTraits, "ip_next_hop");
sai_object_kind!(MplsNextHopTraits, "mpls_next_hop");

pub type IpNextHopSaiId = SaiObjectId<IpNextHopTraits>;
pub type MplsNextHopSaiId = SaiObjectId<MplsNextHopTraits>;
pub type SaiIpNextHop = SaiObject<IpNextHopTraits>;
pub type SaiMplsNextHop = SaiObject<MplsNextHopTraits>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpNextHopAdapterHostKey {
    pub router_interface: RouterInterfaceSaiId,
    pub ip: IpAddress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpNextHopAttributes {
    pub router_interface: RouterInterfaceSaiId,
    pub ip: IpAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MplsNextHopAdapterHostKey {
    pub router_interface: RouterInterfaceSaiId,
    pub ip: IpAddress,
    pub label_stack: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MplsNextHopAttributes {
    pub router_interface: RouterInterfaceSaiId,
    pub ip: IpAddress,
    pub label_stack: Vec<u32>,
}

fn type_attribute(next_hop_type: i32) -> SaiAttribute {
    SaiAttribute::new(next_hop::TYPE, SaiAttributeValue::I32(next_hop_type))
}

impl SaiObjectTraits for IpNextHopTraits {
    const OBJECT_TYPE: SaiObjectType = SaiObjectType::NextHop;
    const ATTRIBUTE_IDS: &'static [SaiAttrId] = &[next_hop::ROUTER_INTERFACE_ID, next_hop::IP];

    type AdapterHostKey = IpNextHopAdapterHostKey;
    type CreateAttributes = IpNextHopAttributes;

    fn to_sai_attributes(attrs: &IpNextHopAttributes) -> Vec<SaiAttribute> {
        vec![
            type_attribute(next_hop::TYPE_IP),
            SaiAttribute::new(
                next_hop::ROUTER_INTERFACE_ID,
                SaiAttributeValue::ObjectId(attrs.router_interface.as_raw()),
            ),
            SaiAttribute::new(next_hop::IP, SaiAttributeValue::Ip(attrs.ip)),
        ]
    }

    fn from_sai_attributes(attrs: &[SaiAttribute]) -> StoreResult<IpNextHopAttributes> {
        let r = AttrReader::new(Self::OBJECT_TYPE, attrs);
        Ok(IpNextHopAttributes {
            router_interface: RouterInterfaceSaiId::from_raw_unchecked(
                r.object_id(next_hop::ROUTER_INTERFACE_ID)?,
            ),
            ip: r.ip(next_hop::IP)?,
        })
    }

    fn adapter_host_key(attrs: &IpNextHopAttributes) -> IpNextHopAdapterHostKey {
        IpNextHopAdapterHostKey {
            router_interface: attrs.router_interface,
            ip: attrs.ip,
        }
    }

    fn condition_attributes() -> Vec<SaiAttribute> {
        vec![type_attribute(next_hop::TYPE_IP)]
    }
}

impl SaiObjectTraits for MplsNextHopTraits {
    const OBJECT_TYPE: SaiObjectType = SaiObjectType::NextHop;
    const ATTRIBUTE_IDS: &'static [SaiAttrId] = &[
        next_hop::ROUTER_INTERFACE_ID,
        next_hop::IP,
        next_hop::LABELSTACK,
    ];

    type AdapterHostKey = MplsNextHopAdapterHostKey;
    type CreateAttributes = MplsNextHopAttributes;

    fn to_sai_attributes(attrs: &MplsNextHopAttributes) -> Vec<SaiAttribute> {
        vec![
            type_attribute(next_hop::TYPE_MPLS),
            SaiAttribute::new(
                next_hop::ROUTER_INTERFACE_ID,
                SaiAttributeValue::ObjectId(attrs.router_interface.as_raw()),
            ),
            SaiAttribute::new(next_hop::IP, SaiAttributeValue::Ip(attrs.ip)),
            SaiAttribute::new(
                next_hop::LABELSTACK,
                SaiAttributeValue::U32List(attrs.label_stack.clone()),
            ),
        ]
    }

    fn from_sai_attributes(attrs: &[SaiAttribute]) -> StoreResult<MplsNextHopAttributes> {
        let r = AttrReader::new(Self::OBJECT_TYPE, attrs);
        Ok(MplsNextHopAttributes {
            router_interface: RouterInterfaceSaiId::from_raw_unchecked(
                r.object_id(next_hop::ROUTER_INTERFACE_ID)?,
            ),
            ip: r.ip(next_hop::IP)?,
            label_stack: r.opt_u32_list(next_hop::LABELSTACK)?.unwrap_or_default(),
        })
    }

    fn adapter_host_key(attrs: &MplsNextHopAttributes) -> MplsNextHopAdapterHostKey {
        MplsNextHopAdapterHostKey {
            router_interface: attrs.router_interface,
            ip: attrs.ip,
            label_stack: attrs.label_stack.clone(),
        }
    }

    fn condition_attributes() -> Vec<SaiAttribute> {
        vec![type_attribute(next_hop::TYPE_MPLS)]
    }
}
