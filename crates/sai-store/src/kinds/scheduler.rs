//! Egress schedulers.
//!
//! A scheduler is identified by its whole configuration, so queues asking
//! for the same scheduling end up sharing one hardware object.

use crate::decode::AttrReader;
use crate::error::StoreResult;
use crate::object::SaiObject;
use crate::traits::SaiObjectTraits;
use sai_api::attribute::scheduler;
use sai_api::{SaiAttrId, SaiAttribute, SaiAttributeValue, SaiObjectId, SaiObjectType};

sai_object_kind!(SchedulerTraits, "scheduler");

pub type SchedulerSaiId = SaiObjectId<SchedulerTraits>;
pub type SaiScheduler = SaiObject<SchedulerTraits>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchedulerAttributes {
    pub scheduling_type: i32,
    pub scheduling_weight: u32,
    pub meter_type: i32,
    pub min_bandwidth_rate: u64,
    pub max_bandwidth_rate: u64,
}

impl SaiObjectTraits for SchedulerTraits {
    const OBJECT_TYPE: SaiObjectType = SaiObjectType::Scheduler;
    const ATTRIBUTE_IDS: &'static [SaiAttrId] = &[
        scheduler::SCHEDULING_TYPE,
        scheduler::SCHEDULING_WEIGHT,
        scheduler::METER_TYPE,
        scheduler::MIN_BANDWIDTH_RATE,
        scheduler::MAX_BANDWIDTH_RATE,
    ];

    type AdapterHostKey = SchedulerAttributes;
    type CreateAttributes = SchedulerAttributes;

    fn to_sai_attributes(attrs: &SchedulerAttributes) -> Vec<SaiAttribute> {
        vec![
            SaiAttribute::new(
                scheduler::SCHEDULING_TYPE,
                SaiAttributeValue::I32(attrs.scheduling_type),
            ),
            SaiAttribute::new(
                scheduler::SCHEDULING_WEIGHT,
                SaiAttributeValue::U32(attrs.scheduling_weight),
            ),
            SaiAttribute::new(scheduler::METER_TYPE, SaiAttributeValue::I32(attrs.meter_type)),
            SaiAttribute::new(
                scheduler::MIN_BANDWIDTH_RATE,
                SaiAttributeValue::U64(attrs.min_bandwidth_rate),
            ),
            SaiAttribute::new(
                scheduler::MAX_BANDWIDTH_RATE,
                SaiAttributeValue::U64(attrs.max_bandwidth_rate),
            ),
        ]
    }

    fn from_sai_attributes(attrs: &[SaiAttribute]) -> StoreResult<SchedulerAttributes> {
        let r = AttrReader::new(Self::OBJECT_TYPE, attrs);
        Ok(SchedulerAttributes {
            scheduling_type: r.i32(scheduler::SCHEDULING_TYPE)?,
            scheduling_weight: r.opt_u32(scheduler::SCHEDULING_WEIGHT)?.unwrap_or(1),
            meter_type: r
                .opt_i32(scheduler::METER_TYPE)?
                .unwrap_or(scheduler::METER_TYPE_BYTES),
            min_bandwidth_rate: r.opt_u64(scheduler::MIN_BANDWIDTH_RATE)?.unwrap_or(0),
            max_bandwidth_rate: r.opt_u64(scheduler::MAX_BANDWIDTH_RATE)?.unwrap_or(0),
        })
    }

    fn adapter_host_key(attrs: &SchedulerAttributes) -> SchedulerAttributes {
        attrs.clone()
    }
}
