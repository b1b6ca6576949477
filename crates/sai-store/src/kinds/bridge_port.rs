//! Bridge ports attaching front-panel ports to the default bridge.

use crate::decode::AttrReader;
use crate::error::StoreResult;
use crate::kinds::port::PortSaiId;
use crate::object::SaiObject;
use crate::traits::SaiObjectTraits;
use sai_api::attribute::bridge_port;
use sai_api::{SaiAttrId, SaiAttribute, SaiAttributeValue, SaiObjectId, SaiObjectType};

sai_object_kind!(BridgePortTraits, "bridge_port");

pub type BridgePortSaiId = SaiObjectId<BridgePortTraits>;
pub type SaiBridgePort = SaiObject<BridgePortTraits>;

/// One bridge port per port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BridgePortAdapterHostKey(pub PortSaiId);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgePortAttributes {
    pub port_id: PortSaiId,
    pub admin_state: bool,
    pub fdb_learning_mode: i32,
}

impl SaiObjectTraits for BridgePortTraits {
    const OBJECT_TYPE: SaiObjectType = SaiObjectType::BridgePort;
    const ATTRIBUTE_IDS: &'static [SaiAttrId] = &[
        bridge_port::PORT_ID,
        bridge_port::ADMIN_STATE,
        bridge_port::FDB_LEARNING_MODE,
    ];

    type AdapterHostKey = BridgePortAdapterHostKey;
    type CreateAttributes = BridgePortAttributes;

    fn to_sai_attributes(attrs: &BridgePortAttributes) -> Vec<SaiAttribute> {
        vec![
            SaiAttribute::new(
                bridge_port::TYPE,
                SaiAttributeValue::I32(bridge_port::TYPE_PORT),
            ),
            SaiAttribute::new(
                bridge_port::PORT_ID,
                SaiAttributeValue::ObjectId(attrs.port_id.as_raw()),
            ),
            SaiAttribute::new(
                bridge_port::ADMIN_STATE,
                SaiAttributeValue::Bool(attrs.admin_state),
            ),
            SaiAttribute::new(
                bridge_port::FDB_LEARNING_MODE,
                SaiAttributeValue::I32(attrs.fdb_learning_mode),
            ),
        ]
    }

    fn from_sai_attributes(attrs: &[SaiAttribute]) -> StoreResult<BridgePortAttributes> {
        let r = AttrReader::new(Self::OBJECT_TYPE, attrs);
        Ok(BridgePortAttributes {
            port_id: PortSaiId::from_raw_unchecked(r.object_id(bridge_port::PORT_ID)?),
            admin_state: r.opt_bool(bridge_port::ADMIN_STATE)?.unwrap_or(false),
            fdb_learning_mode: r
                .opt_i32(bridge_port::FDB_LEARNING_MODE)?
                .unwrap_or(bridge_port::FDB_LEARNING_MODE_HW),
        })
    }

    fn adapter_host_key(attrs: &BridgePortAttributes) -> BridgePortAdapterHostKey {
        BridgePortAdapterHostKey(attrs.port_id)
    }
}
