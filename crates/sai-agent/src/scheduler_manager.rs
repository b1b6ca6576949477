//! Schedulers derived from queue configuration.

use crate::error::{ManagerError, ManagerResult};
use crate::state::{PortQueue, RateUnit};
use sai_api::attribute::scheduler;
use sai_store::kinds::{SaiScheduler, SchedulerAttributes, SchedulerTraits};
use sai_store::SaiStore;
use std::sync::Arc;
use switch_types::QueueScheduling;

#[derive(Debug)]
pub struct SaiSchedulerManager {
    store: Arc<SaiStore>,
}

impl SaiSchedulerManager {
    pub fn new(store: Arc<SaiStore>) -> Self {
        Self { store }
    }

    /// Returns the scheduler implementing a queue's configuration.
    ///
    /// Queues with equal scheduling get the same scheduler object.
    pub fn create_scheduler(&self, queue: &PortQueue) -> ManagerResult<Arc<SaiScheduler>> {
        let attributes = scheduler_attributes(queue)?;
        Ok(self
            .store
            .get::<SchedulerTraits>()
            .set_object(attributes.clone(), attributes)?)
    }
}

/// Scheduler attributes for a queue.
///
/// Fails when a kbps rate does not fit the byte rate SAI expects.
pub fn scheduler_attributes(queue: &PortQueue) -> ManagerResult<SchedulerAttributes> {
    let scheduling_type = match queue.scheduling {
        QueueScheduling::StrictPriority => scheduler::TYPE_STRICT,
        QueueScheduling::WeightedRoundRobin => scheduler::TYPE_WRR,
        QueueScheduling::DeficitRoundRobin => scheduler::TYPE_DWRR,
    };
    let rate = queue.rate.unwrap_or_default();
    let meter_type = match rate.unit {
        RateUnit::PacketsPerSec => scheduler::METER_TYPE_PACKETS,
        RateUnit::KbitsPerSec => scheduler::METER_TYPE_BYTES,
    };
    // Byte meters are programmed in bytes per second.
    let scale: u64 = match rate.unit {
        RateUnit::PacketsPerSec => 1,
        RateUnit::KbitsPerSec => 1000 / 8,
    };
    let meter_rate = |value: u64| {
        value.checked_mul(scale).ok_or_else(|| {
            ManagerError::InvalidConfig(format!(
                "queue {} rate {} overflows the scheduler meter",
                queue.index, value
            ))
        })
    };
    Ok(SchedulerAttributes {
        scheduling_type,
        scheduling_weight: queue.weight,
        meter_type,
        min_bandwidth_rate: meter_rate(rate.minimum)?,
        max_bandwidth_rate: meter_rate(rate.maximum)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::PortQueueRate;
    use pretty_assertions::assert_eq;
    use sai_api::{FakeSai, SaiApi, SaiObjectType};

    fn setup() -> (Arc<FakeSai>, SaiSchedulerManager) {
        let sai = Arc::new(FakeSai::new());
        let store = Arc::new(SaiStore::new(Arc::clone(&sai) as Arc<dyn SaiApi>));
        (sai, SaiSchedulerManager::new(store))
    }

    #[test]
    fn test_equal_configs_share_a_scheduler() {
        let (sai, manager) = setup();
        let a = manager.create_scheduler(&PortQueue::unicast(0)).unwrap();
        let b = manager.create_scheduler(&PortQueue::unicast(5)).unwrap();

        let mut strict = PortQueue::unicast(7);
        strict.scheduling = QueueScheduling::StrictPriority;
        let c = manager.create_scheduler(&strict).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(sai.object_count(SaiObjectType::Scheduler), 2);
    }

    #[test]
    fn test_scheduler_removed_with_last_queue_reference() {
        let (sai, manager) = setup();
        let a = manager.create_scheduler(&PortQueue::unicast(0)).unwrap();
        let b = manager.create_scheduler(&PortQueue::unicast(1)).unwrap();
        drop(a);
        assert_eq!(sai.object_count(SaiObjectType::Scheduler), 1);
        drop(b);
        assert_eq!(sai.object_count(SaiObjectType::Scheduler), 0);
    }

    #[test]
    fn test_kbps_rate_in_bytes() {
        let mut queue = PortQueue::unicast(0);
        queue.weight = 4;
        queue.rate = Some(PortQueueRate {
            unit: RateUnit::KbitsPerSec,
            minimum: 8,
            maximum: 800,
        });
        assert_eq!(
            scheduler_attributes(&queue).unwrap(),
            SchedulerAttributes {
                scheduling_type: scheduler::TYPE_WRR,
                scheduling_weight: 4,
                meter_type: scheduler::METER_TYPE_BYTES,
                min_bandwidth_rate: 1_000,
                max_bandwidth_rate: 100_000,
            }
        );
    }

    #[test]
    fn test_kbps_rate_overflow_is_rejected() {
        let (sai, manager) = setup();
        let mut queue = PortQueue::unicast(3);
        queue.rate = Some(PortQueueRate {
            unit: RateUnit::KbitsPerSec,
            minimum: 0,
            maximum: u64::MAX / 100,
        });

        let err = manager.create_scheduler(&queue).unwrap_err();
        assert!(matches!(err, ManagerError::InvalidConfig(_)));
        assert!(!err.is_fatal());
        assert_eq!(sai.object_count(SaiObjectType::Scheduler), 0);

        // Packet meters are not scaled.
        queue.rate = Some(PortQueueRate {
            unit: RateUnit::PacketsPerSec,
            minimum: 0,
            maximum: u64::MAX / 100,
        });
        assert_eq!(
            scheduler_attributes(&queue).unwrap().max_bandwidth_rate,
            u64::MAX / 100
        );
    }
}
