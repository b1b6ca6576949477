//! VLAN router interfaces.

use crate::decode::AttrReader;
use crate::error::StoreResult;
use crate::kinds::virtual_router::VirtualRouterSaiId;
use crate::object::SaiObject;
use crate::traits::{SaiObjectTraits, SaiPublisherTraits};
use sai_api::attribute::router_interface;
use sai_api::{SaiAttrId, SaiAttribute, SaiAttributeValue, SaiObjectId, SaiObjectType};
use switch_types::MacAddress;

sai_object_kind!(RouterInterfaceTraits, "router_interface");

pub type RouterInterfaceSaiId = SaiObjectId<RouterInterfaceTraits>;
pub type SaiRouterInterface = SaiObject<RouterInterfaceTraits>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouterInterfaceAdapterHostKey {
    pub virtual_router: VirtualRouterSaiId,
    pub vlan_id: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterInterfaceAttributes {
    pub virtual_router: VirtualRouterSaiId,
    pub vlan_id: u16,
    pub src_mac: MacAddress,
    pub mtu: u32,
}

pub const DEFAULT_MTU: u32 = 9000;

impl SaiObjectTraits for RouterInterfaceTraits {
    const OBJECT_TYPE: SaiObjectType = SaiObjectType::RouterInterface;
    const ATTRIBUTE_IDS: &'static [SaiAttrId] = &[
        router_interface::VIRTUAL_ROUTER_ID,
        router_interface::VLAN_ID,
        router_interface::SRC_MAC_ADDRESS,
        router_interface::MTU,
    ];

    type AdapterHostKey = RouterInterfaceAdapterHostKey;
    type CreateAttributes = RouterInterfaceAttributes;

    fn to_sai_attributes(attrs: &RouterInterfaceAttributes) -> Vec<SaiAttribute> {
        vec![
            SaiAttribute::new(
                router_interface::VIRTUAL_ROUTER_ID,
                SaiAttributeValue::ObjectId(attrs.virtual_router.as_raw()),
            ),
            SaiAttribute::new(
                router_interface::TYPE,
                SaiAttributeValue::I32(router_interface::TYPE_VLAN),
            ),
            SaiAttribute::new(router_interface::VLAN_ID, SaiAttributeValue::U16(attrs.vlan_id)),
            SaiAttribute::new(
                router_interface::SRC_MAC_ADDRESS,
                SaiAttributeValue::Mac(attrs.src_mac),
            ),
            SaiAttribute::new(router_interface::MTU, SaiAttributeValue::U32(attrs.mtu)),
        ]
    }

    fn from_sai_attributes(attrs: &[SaiAttribute]) -> StoreResult<RouterInterfaceAttributes> {
        let r = AttrReader::new(Self::OBJECT_TYPE, attrs);
        Ok(RouterInterfaceAttributes {
            virtual_router: VirtualRouterSaiId::from_raw_unchecked(
                r.object_id(router_interface::VIRTUAL_ROUTER_ID)?,
            ),
            vlan_id: r.u16(router_interface::VLAN_ID)?,
            src_mac: r.mac(router_interface::SRC_MAC_ADDRESS)?,
            mtu: r.opt_u32(router_interface::MTU)?.unwrap_or(DEFAULT_MTU),
        })
    }

    fn adapter_host_key(attrs: &RouterInterfaceAttributes) -> RouterInterfaceAdapterHostKey {
        RouterInterfaceAdapterHostKey {
            virtual_router: attrs.virtual_router,
            vlan_id: attrs.vlan_id,
        }
    }
}

impl SaiPublisherTraits for RouterInterfaceTraits {}
