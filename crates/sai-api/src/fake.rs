//! In-memory SAI adapter.
//!
//! `FakeSai` behaves like a small, well-mannered ASIC: ids carry their object
//! type, ports come up with their egress queues already created, and removing
//! a port takes its queues with it. Every call is recorded so that tests can
//! assert on exactly what reached "hardware".

use crate::api::{SaiApi, SaiOperation};
use crate::attribute::{self, SaiAttrId, SaiAttribute, SaiAttributeValue, SaiStatId};
use crate::error::{SaiError, SaiResult, SaiStatus};
use crate::types::{RawSaiObjectId, SaiObjectType};
use log::debug;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use switch_types::MacAddress;

/// Number of unicast queues created with every port unless configured otherwise.
pub const DEFAULT_QUEUES_PER_PORT: u32 = 8;

/// Source MAC of the default virtual router.
pub const DEFAULT_ROUTER_MAC: MacAddress = MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaiCall {
    pub operation: SaiOperation,
    pub object_type: SaiObjectType,
    pub object_id: Option<RawSaiObjectId>,
    pub attr_id: Option<SaiAttrId>,
}

type RemoveHook = Arc<dyn Fn(SaiObjectType, RawSaiObjectId) + Send + Sync>;

#[derive(Debug)]
struct FakeObject {
    object_type: SaiObjectType,
    attrs: BTreeMap<SaiAttrId, SaiAttributeValue>,
}

#[derive(Debug)]
struct InjectedFailure {
    operation: SaiOperation,
    object_type: SaiObjectType,
    status: SaiStatus,
}

#[derive(Debug, Default)]
struct FakeState {
    objects: BTreeMap<RawSaiObjectId, FakeObject>,
    next_seq: HashMap<SaiObjectType, u64>,
    stats: HashMap<(RawSaiObjectId, SaiStatId), u64>,
    calls: Vec<SaiCall>,
    failures: Vec<InjectedFailure>,
}

impl FakeState {
    fn allocate(&mut self, object_type: SaiObjectType) -> RawSaiObjectId {
        let seq = self.next_seq.entry(object_type).or_insert(0);
        *seq += 1;
        object_type.make_id(*seq)
    }

    fn insert(
        &mut self,
        object_type: SaiObjectType,
        attrs: impl IntoIterator<Item = (SaiAttrId, SaiAttributeValue)>,
    ) -> RawSaiObjectId {
        let id = self.allocate(object_type);
        self.objects.insert(
            id,
            FakeObject {
                object_type,
                attrs: attrs.into_iter().collect(),
            },
        );
        id
    }

    fn record(
        &mut self,
        operation: SaiOperation,
        object_type: SaiObjectType,
        object_id: Option<RawSaiObjectId>,
        attr_id: Option<SaiAttrId>,
    ) {
        self.calls.push(SaiCall {
            operation,
            object_type,
            object_id,
            attr_id,
        });
    }

    /// Consumes a matching injected failure, if one is armed.
    fn take_failure(
        &mut self,
        operation: SaiOperation,
        object_type: SaiObjectType,
    ) -> SaiResult<()> {
        match self
            .failures
            .iter()
            .position(|f| f.operation == operation && f.object_type == object_type)
        {
            Some(pos) => Err(SaiError::from_status(self.failures.remove(pos).status)),
            None => Ok(()),
        }
    }

    fn lookup(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
    ) -> SaiResult<&FakeObject> {
        self.objects
            .get(&object_id)
            .filter(|o| o.object_type == object_type)
            .ok_or(SaiError::ObjectNotFound {
                object_type,
                object_id,
            })
    }

    fn lanes_in_use(&self, lanes: &[u32]) -> bool {
        self.objects
            .values()
            .filter(|o| o.object_type == SaiObjectType::Port)
            .filter_map(|o| o.attrs.get(&attribute::port::HW_LANE_LIST))
            .filter_map(SaiAttributeValue::as_u32_list)
            .any(|used| used.iter().any(|lane| lanes.contains(lane)))
    }

    fn create_port(
        &mut self,
        attributes: &[SaiAttribute],
        queues_per_port: u32,
    ) -> SaiResult<RawSaiObjectId> {
        let lanes = attribute::find_attribute(attributes, attribute::port::HW_LANE_LIST)
            .and_then(SaiAttributeValue::as_u32_list)
            .ok_or(SaiError::from_status(SaiStatus::MandatoryAttributeMissing))?;
        if lanes.is_empty() {
            return Err(SaiError::invalid_parameter("port created without lanes"));
        }
        if self.lanes_in_use(lanes) {
            return Err(SaiError::from_status(SaiStatus::ItemAlreadyExists));
        }

        let port_id = self.insert(
            SaiObjectType::Port,
            attributes.iter().map(|a| (a.id, a.value.clone())),
        );
        let queues: Vec<RawSaiObjectId> = (0..queues_per_port)
            .map(|index| {
                self.insert(
                    SaiObjectType::Queue,
                    [
                        (
                            attribute::queue::TYPE,
                            SaiAttributeValue::I32(attribute::queue::TYPE_UNICAST),
                        ),
                        (attribute::queue::PORT, SaiAttributeValue::ObjectId(port_id)),
                        (attribute::queue::INDEX, SaiAttributeValue::U32(index)),
                        (
                            attribute::queue::PARENT_SCHEDULER_NODE,
                            SaiAttributeValue::ObjectId(port_id),
                        ),
                    ],
                )
            })
            .collect();

        if let Some(port) = self.objects.get_mut(&port_id) {
            port.attrs.insert(
                attribute::port::QOS_NUMBER_OF_QUEUES,
                SaiAttributeValue::U32(queues_per_port),
            );
            port.attrs.insert(
                attribute::port::QOS_QUEUE_LIST,
                SaiAttributeValue::ObjectList(queues),
            );
        }
        Ok(port_id)
    }

    fn check_references(&self, attributes: &[SaiAttribute]) -> SaiResult<()> {
        for attr in attributes {
            if let SaiAttributeValue::ObjectId(id) = attr.value {
                if id != crate::types::SAI_NULL_OBJECT_ID && !self.objects.contains_key(&id) {
                    return Err(SaiError::from_status(SaiStatus::InvalidObjectId));
                }
            }
        }
        Ok(())
    }
}

/// Attributes that can only be given at create time or only read.
fn is_settable(object_type: SaiObjectType, attr_id: SaiAttrId) -> bool {
    use crate::attribute::{bridge_port, next_hop, port, queue};
    match object_type {
        SaiObjectType::Port => !matches!(
            attr_id,
            port::HW_LANE_LIST | port::QOS_NUMBER_OF_QUEUES | port::QOS_QUEUE_LIST
        ),
        SaiObjectType::Queue => !matches!(attr_id, queue::TYPE | queue::PORT | queue::INDEX),
        SaiObjectType::BridgePort => !matches!(attr_id, bridge_port::TYPE | bridge_port::PORT_ID),
        SaiObjectType::NextHop => !matches!(
            attr_id,
            next_hop::TYPE | next_hop::IP | next_hop::ROUTER_INTERFACE_ID | next_hop::LABELSTACK
        ),
        _ => true,
    }
}

/// In-memory SAI adapter for tests and standalone runs.
pub struct FakeSai {
    queues_per_port: u32,
    state: Mutex<FakeState>,
    remove_hook: RwLock<Option<RemoveHook>>,
}

impl FakeSai {
    pub fn new() -> Self {
        Self::with_queues_per_port(DEFAULT_QUEUES_PER_PORT)
    }

    /// A fake whose ports each come up with `queues_per_port` unicast queues.
    pub fn with_queues_per_port(queues_per_port: u32) -> Self {
        let mut state = FakeState::default();
        state.insert(SaiObjectType::Switch, []);
        state.insert(
            SaiObjectType::VirtualRouter,
            [(
                attribute::virtual_router::SRC_MAC_ADDRESS,
                SaiAttributeValue::Mac(DEFAULT_ROUTER_MAC),
            )],
        );
        Self {
            queues_per_port,
            state: Mutex::new(state),
            remove_hook: RwLock::new(None),
        }
    }

    /// Returns every call seen so far, oldest first.
    pub fn calls(&self) -> Vec<SaiCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn count_calls(&self, operation: SaiOperation, object_type: SaiObjectType) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.operation == operation && c.object_type == object_type)
            .count()
    }

    /// Makes the next `operation` on `object_type` fail with `status`.
    pub fn fail_next(&self, operation: SaiOperation, object_type: SaiObjectType, status: SaiStatus) {
        self.state.lock().failures.push(InjectedFailure {
            operation,
            object_type,
            status,
        });
    }

    /// Installs a callback run on every successful remove.
    ///
    /// The callback runs without any internal lock held, so it may call back
    /// into the fake or inspect state owned by the caller.
    pub fn set_remove_hook<F>(&self, hook: F)
    where
        F: Fn(SaiObjectType, RawSaiObjectId) + Send + Sync + 'static,
    {
        *self.remove_hook.write() = Some(Arc::new(hook));
    }

    pub fn set_stat(&self, object_id: RawSaiObjectId, stat_id: SaiStatId, value: u64) {
        self.state.lock().stats.insert((object_id, stat_id), value);
    }

    pub fn object_count(&self, object_type: SaiObjectType) -> usize {
        self.state
            .lock()
            .objects
            .values()
            .filter(|o| o.object_type == object_type)
            .count()
    }

    pub fn exists(&self, object_id: RawSaiObjectId) -> bool {
        self.state.lock().objects.contains_key(&object_id)
    }

    /// Places an object directly into the tables, bypassing validation and the call log.
    ///
    /// Stands in for state left behind by a previous run of the agent.
    pub fn insert_object(
        &self,
        object_type: SaiObjectType,
        attributes: &[SaiAttribute],
    ) -> RawSaiObjectId {
        self.state
            .lock()
            .insert(object_type, attributes.iter().map(|a| (a.id, a.value.clone())))
    }
}

impl Default for FakeSai {
    fn default() -> Self {
        Self::new()
    }
}

impl SaiApi for FakeSai {
    fn create(
        &self,
        object_type: SaiObjectType,
        attributes: &[SaiAttribute],
    ) -> SaiResult<RawSaiObjectId> {
        let mut state = self.state.lock();
        state.record(SaiOperation::Create, object_type, None, None);
        state.take_failure(SaiOperation::Create, object_type)?;
        state.check_references(attributes)?;

        let id = match object_type {
            SaiObjectType::Port => state.create_port(attributes, self.queues_per_port)?,
            SaiObjectType::Queue | SaiObjectType::Switch => {
                return Err(SaiError::from_status(SaiStatus::NotSupported));
            }
            _ => state.insert(object_type, attributes.iter().map(|a| (a.id, a.value.clone()))),
        };
        debug!("fake sai: created {} 0x{:016x}", object_type, id);
        Ok(id)
    }

    fn remove(&self, object_type: SaiObjectType, object_id: RawSaiObjectId) -> SaiResult<()> {
        {
            let mut state = self.state.lock();
            state.record(SaiOperation::Remove, object_type, Some(object_id), None);
            state.take_failure(SaiOperation::Remove, object_type)?;
            state.lookup(object_type, object_id)?;
            if object_type == SaiObjectType::Switch {
                return Err(SaiError::from_status(SaiStatus::NotSupported));
            }

            state.objects.remove(&object_id);
            state.stats.retain(|(id, _), _| *id != object_id);
            if object_type == SaiObjectType::Port {
                let owned: Vec<RawSaiObjectId> = state
                    .objects
                    .iter()
                    .filter(|(_, o)| {
                        o.object_type == SaiObjectType::Queue
                            && o.attrs.get(&attribute::queue::PORT)
                                == Some(&SaiAttributeValue::ObjectId(object_id))
                    })
                    .map(|(id, _)| *id)
                    .collect();
                for queue in owned {
                    state.objects.remove(&queue);
                    state.stats.retain(|(id, _), _| *id != queue);
                }
            }
            debug!("fake sai: removed {} 0x{:016x}", object_type, object_id);
        }

        let hook = self.remove_hook.read().clone();
        if let Some(hook) = hook {
            hook(object_type, object_id);
        }
        Ok(())
    }

    fn set_attribute(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        attribute: &SaiAttribute,
    ) -> SaiResult<()> {
        let mut state = self.state.lock();
        state.record(
            SaiOperation::Set,
            object_type,
            Some(object_id),
            Some(attribute.id),
        );
        state.take_failure(SaiOperation::Set, object_type)?;
        state.lookup(object_type, object_id)?;
        if !is_settable(object_type, attribute.id) {
            return Err(SaiError::from_status(SaiStatus::InvalidAttribute));
        }
        state.check_references(std::slice::from_ref(attribute))?;

        if let Some(object) = state.objects.get_mut(&object_id) {
            object.attrs.insert(attribute.id, attribute.value.clone());
        }
        Ok(())
    }

    fn get_attribute(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        attr_id: SaiAttrId,
    ) -> SaiResult<SaiAttributeValue> {
        let mut state = self.state.lock();
        state.record(SaiOperation::Get, object_type, Some(object_id), Some(attr_id));
        state.take_failure(SaiOperation::Get, object_type)?;
        state
            .lookup(object_type, object_id)?
            .attrs
            .get(&attr_id)
            .cloned()
            .ok_or(SaiError::AttributeNotFound {
                object_type,
                object_id,
                attr_id,
            })
    }

    fn get_object_keys(&self, object_type: SaiObjectType) -> SaiResult<Vec<RawSaiObjectId>> {
        let mut state = self.state.lock();
        state.record(SaiOperation::GetObjectKeys, object_type, None, None);
        state.take_failure(SaiOperation::GetObjectKeys, object_type)?;
        Ok(state
            .objects
            .iter()
            .filter(|(_, o)| o.object_type == object_type)
            .map(|(id, _)| *id)
            .collect())
    }

    fn get_stats(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        stat_ids: &[SaiStatId],
    ) -> SaiResult<Vec<u64>> {
        let mut state = self.state.lock();
        state.record(SaiOperation::GetStats, object_type, Some(object_id), None);
        state.take_failure(SaiOperation::GetStats, object_type)?;
        state.lookup(object_type, object_id)?;
        Ok(stat_ids
            .iter()
            .map(|stat| state.stats.get(&(object_id, *stat)).copied().unwrap_or(0))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::port;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn port_attrs(lanes: Vec<u32>) -> Vec<SaiAttribute> {
        vec![
            SaiAttribute::new(port::HW_LANE_LIST, SaiAttributeValue::U32List(lanes)),
            SaiAttribute::new(port::SPEED, SaiAttributeValue::U32(100_000)),
        ]
    }

    #[test]
    fn test_port_create_brings_up_queues() {
        let sai = FakeSai::with_queues_per_port(4);
        let port = sai.create(SaiObjectType::Port, &port_attrs(vec![1, 2, 3, 4])).unwrap();

        assert_eq!(SaiObjectType::query(port), Some(SaiObjectType::Port));
        let queues = sai
            .get_attribute(SaiObjectType::Port, port, port::QOS_QUEUE_LIST)
            .unwrap();
        assert_eq!(queues.as_object_list().map(<[_]>::len), Some(4));
        assert_eq!(sai.object_count(SaiObjectType::Queue), 4);
    }

    #[test]
    fn test_overlapping_lanes_rejected() {
        let sai = FakeSai::new();
        sai.create(SaiObjectType::Port, &port_attrs(vec![1, 2])).unwrap();
        let err = sai
            .create(SaiObjectType::Port, &port_attrs(vec![2, 3]))
            .unwrap_err();
        assert_eq!(err, SaiError::from_status(SaiStatus::ItemAlreadyExists));
    }

    #[test]
    fn test_port_remove_cascades_to_queues() {
        let sai = FakeSai::new();
        let port = sai.create(SaiObjectType::Port, &port_attrs(vec![1])).unwrap();
        sai.remove(SaiObjectType::Port, port).unwrap();
        assert_eq!(sai.object_count(SaiObjectType::Queue), 0);
        assert!(!sai.exists(port));
    }

    #[test]
    fn test_create_only_attribute_rejected_on_set() {
        let sai = FakeSai::new();
        let port = sai.create(SaiObjectType::Port, &port_attrs(vec![1])).unwrap();
        let err = sai
            .set_attribute(
                SaiObjectType::Port,
                port,
                &SaiAttribute::new(port::HW_LANE_LIST, SaiAttributeValue::U32List(vec![5])),
            )
            .unwrap_err();
        assert_eq!(err, SaiError::from_status(SaiStatus::InvalidAttribute));
    }

    #[test]
    fn test_fail_next_is_one_shot() {
        let sai = FakeSai::new();
        sai.fail_next(SaiOperation::Create, SaiObjectType::Port, SaiStatus::TableFull);
        assert!(sai.create(SaiObjectType::Port, &port_attrs(vec![1])).is_err());
        assert!(sai.create(SaiObjectType::Port, &port_attrs(vec![1])).is_ok());
    }

    #[test]
    fn test_remove_hook_and_call_log() {
        let sai = FakeSai::new();
        let removed = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&removed);
        sai.set_remove_hook(move |object_type, _| {
            assert_eq!(object_type, SaiObjectType::Port);
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let port = sai.create(SaiObjectType::Port, &port_attrs(vec![7])).unwrap();
        sai.remove(SaiObjectType::Port, port).unwrap();

        assert_eq!(removed.load(Ordering::SeqCst), 1);
        assert_eq!(sai.count_calls(SaiOperation::Create, SaiObjectType::Port), 1);
        assert_eq!(sai.count_calls(SaiOperation::Remove, SaiObjectType::Port), 1);
    }

    #[test]
    fn test_default_virtual_router_present() {
        let sai = FakeSai::new();
        let routers = sai.get_object_keys(SaiObjectType::VirtualRouter).unwrap();
        assert_eq!(routers.len(), 1);
        let mac = sai
            .get_attribute(
                SaiObjectType::VirtualRouter,
                routers[0],
                attribute::virtual_router::SRC_MAC_ADDRESS,
            )
            .unwrap();
        assert_eq!(mac.as_mac(), Some(DEFAULT_ROUTER_MAC));
    }

    #[test]
    fn test_stats_default_to_zero() {
        let sai = FakeSai::new();
        let port = sai.create(SaiObjectType::Port, &port_attrs(vec![1])).unwrap();
        sai.set_stat(port, port::STAT_IF_IN_OCTETS, 1500);
        let stats = sai
            .get_stats(
                SaiObjectType::Port,
                port,
                &[port::STAT_IF_IN_OCTETS, port::STAT_IF_OUT_OCTETS],
            )
            .unwrap();
        assert_eq!(stats, vec![1500, 0]);
    }
}
