//! The default virtual router, created by the adapter at switch init.

use crate::decode::AttrReader;
use crate::error::StoreResult;
use crate::object::SaiObject;
use crate::traits::{SaiAdapterOwnedTraits, SaiObjectTraits};
use sai_api::attribute::virtual_router;
use sai_api::{SaiAttrId, SaiAttribute, SaiAttributeValue, SaiObjectId, SaiObjectType};
use switch_types::MacAddress;

sai_object_kind!(VirtualRouterTraits, "virtual_router");

pub type VirtualRouterSaiId = SaiObjectId<VirtualRouterTraits>;
pub type SaiVirtualRouter = SaiObject<VirtualRouterTraits>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualRouterAttributes {
    pub src_mac: MacAddress,
}

impl SaiObjectTraits for VirtualRouterTraits {
    const OBJECT_TYPE: SaiObjectType = SaiObjectType::VirtualRouter;
    const ATTRIBUTE_IDS: &'static [SaiAttrId] = &[virtual_router::SRC_MAC_ADDRESS];
    const ADAPTER_OWNED: bool = true;

    /// There is a single default router.
    type AdapterHostKey = ();
    type CreateAttributes = VirtualRouterAttributes;

    fn to_sai_attributes(attrs: &VirtualRouterAttributes) -> Vec<SaiAttribute> {
        vec![SaiAttribute::new(
            virtual_router::SRC_MAC_ADDRESS,
            SaiAttributeValue::Mac(attrs.src_mac),
        )]
    }

    fn from_sai_attributes(attrs: &[SaiAttribute]) -> StoreResult<VirtualRouterAttributes> {
        let r = AttrReader::new(Self::OBJECT_TYPE, attrs);
        Ok(VirtualRouterAttributes {
            src_mac: r.opt_mac(virtual_router::SRC_MAC_ADDRESS)?.unwrap_or_default(),
        })
    }

    fn adapter_host_key(_attrs: &VirtualRouterAttributes) {}
}

impl SaiAdapterOwnedTraits for VirtualRouterTraits {}
