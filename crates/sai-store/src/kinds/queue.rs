//! Egress queues. Created by the adapter together with their port.

use crate::decode::AttrReader;
use crate::error::StoreResult;
use crate::kinds::port::PortSaiId;
use crate::kinds::scheduler::SchedulerSaiId;
use crate::object::SaiObject;
use crate::traits::{SaiAdapterOwnedTraits, SaiObjectTraits};
use sai_api::attribute::queue;
use sai_api::{
    RawSaiObjectId, SaiAttrId, SaiAttribute, SaiAttributeValue, SaiObjectId, SaiObjectType,
    SaiStatId, SAI_NULL_OBJECT_ID,
};

sai_object_kind!(QueueTraits, "queue");

pub type QueueSaiId = SaiObjectId<QueueTraits>;
pub type SaiQueue = SaiObject<QueueTraits>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueAdapterHostKey {
    pub queue_type: i32,
    pub index: u32,
    pub port: PortSaiId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueAttributes {
    pub queue_type: i32,
    pub port: PortSaiId,
    pub index: u32,
    pub parent_scheduler_node: RawSaiObjectId,
    pub scheduler_profile_id: Option<SchedulerSaiId>,
}

impl SaiObjectTraits for QueueTraits {
    const OBJECT_TYPE: SaiObjectType = SaiObjectType::Queue;
    const ATTRIBUTE_IDS: &'static [SaiAttrId] = &[
        queue::TYPE,
        queue::PORT,
        queue::INDEX,
        queue::PARENT_SCHEDULER_NODE,
        queue::SCHEDULER_PROFILE_ID,
    ];
    const STATS: &'static [SaiStatId] = &[
        queue::STAT_PACKETS,
        queue::STAT_BYTES,
        queue::STAT_DROPPED_PACKETS,
        queue::STAT_DROPPED_BYTES,
    ];
    const ADAPTER_OWNED: bool = true;

    type AdapterHostKey = QueueAdapterHostKey;
    type CreateAttributes = QueueAttributes;

    fn to_sai_attributes(attrs: &QueueAttributes) -> Vec<SaiAttribute> {
        vec![
            SaiAttribute::new(queue::TYPE, SaiAttributeValue::I32(attrs.queue_type)),
            SaiAttribute::new(queue::PORT, SaiAttributeValue::ObjectId(attrs.port.as_raw())),
            SaiAttribute::new(queue::INDEX, SaiAttributeValue::U32(attrs.index)),
            SaiAttribute::new(
                queue::PARENT_SCHEDULER_NODE,
                SaiAttributeValue::ObjectId(attrs.parent_scheduler_node),
            ),
            SaiAttribute::new(
                queue::SCHEDULER_PROFILE_ID,
                SaiAttributeValue::ObjectId(
                    attrs
                        .scheduler_profile_id
                        .map_or(SAI_NULL_OBJECT_ID, |id| id.as_raw()),
                ),
            ),
        ]
    }

    fn from_sai_attributes(attrs: &[SaiAttribute]) -> StoreResult<QueueAttributes> {
        let r = AttrReader::new(Self::OBJECT_TYPE, attrs);
        let port = PortSaiId::from_raw_unchecked(r.object_id(queue::PORT)?);
        Ok(QueueAttributes {
            queue_type: r.i32(queue::TYPE)?,
            port,
            index: r.u32(queue::INDEX)?,
            parent_scheduler_node: r
                .opt_object_id(queue::PARENT_SCHEDULER_NODE)?
                .unwrap_or(port.as_raw()),
            scheduler_profile_id: r
                .opt_object_id(queue::SCHEDULER_PROFILE_ID)?
                .and_then(SchedulerSaiId::from_raw),
        })
    }

    fn adapter_host_key(attrs: &QueueAttributes) -> QueueAdapterHostKey {
        QueueAdapterHostKey {
            queue_type: attrs.queue_type,
            index: attrs.index,
            port: attrs.port,
        }
    }
}

impl SaiAdapterOwnedTraits for QueueTraits {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_scheduler_profile_reads_as_none() {
        let attrs = vec![
            SaiAttribute::new(queue::TYPE, SaiAttributeValue::I32(queue::TYPE_UNICAST)),
            SaiAttribute::new(queue::PORT, SaiAttributeValue::ObjectId(0x1_0000_0000_0001)),
            SaiAttribute::new(queue::INDEX, SaiAttributeValue::U32(3)),
        ];
        let decoded = QueueTraits::from_sai_attributes(&attrs).unwrap();
        assert_eq!(decoded.scheduler_profile_id, None);
        assert_eq!(decoded.parent_scheduler_node, 0x1_0000_0000_0001);

        // A null profile id is programmed explicitly so that detaching works.
        let encoded = QueueTraits::to_sai_attributes(&decoded);
        assert!(encoded.contains(&SaiAttribute::new(
            queue::SCHEDULER_PROFILE_ID,
            SaiAttributeValue::ObjectId(SAI_NULL_OBJECT_ID)
        )));
        assert_eq!(QueueTraits::from_sai_attributes(&encoded).unwrap(), decoded);
    }
}
