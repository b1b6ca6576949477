//! Warm-boot behaviour of the store registry against the fake adapter.

use pretty_assertions::assert_eq;
use sai_api::attribute::{bridge_port, next_hop, port, queue, scheduler};
use sai_api::{FakeSai, SaiApi, SaiAttribute, SaiAttributeValue, SaiObjectType, SaiOperation};
use sai_store::kinds::*;
use sai_store::{SaiObjectTraits, SaiStore, StoreError, StoreSnapshot};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use switch_types::{IpAddress, MacAddress};
use tempfile::TempDir;

fn new_store(sai: &Arc<FakeSai>) -> SaiStore {
    SaiStore::new(Arc::clone(sai) as Arc<dyn SaiApi>)
}

fn port_attrs(lanes: &[u32]) -> PortAttributes {
    PortAttributes {
        hw_lane_list: lanes.to_vec(),
        speed: 100_000,
        admin_state: true,
        fec_mode: port::FEC_MODE_RS,
        internal_loopback_mode: port::LOOPBACK_NONE,
        media_type: port::MEDIA_TYPE_FIBER,
        global_flow_control_mode: port::FLOW_CONTROL_BOTH_ENABLE,
        port_vlan_id: 1,
    }
}

fn default_router(store: &SaiStore) -> Arc<SaiVirtualRouter> {
    store
        .get::<VirtualRouterTraits>()
        .get(&())
        .expect("default virtual router reloaded")
}

fn router_interface(store: &SaiStore, vlan_id: u16) -> Arc<SaiRouterInterface> {
    let virtual_router = default_router(store).adapter_key();
    let attrs = RouterInterfaceAttributes {
        virtual_router,
        vlan_id,
        src_mac: MacAddress::new([0x02, 0, 0, 0, 0, 0x10]),
        mtu: 9000,
    };
    store
        .get::<RouterInterfaceTraits>()
        .set_object(RouterInterfaceTraits::adapter_host_key(&attrs), attrs)
        .unwrap()
}

#[test]
fn test_round_trip_through_snapshot() {
    let sai = Arc::new(FakeSai::with_queues_per_port(4));
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sai_store.json");

    let (port_key, port_id, port_attributes, queue_key, queue_attributes, nh_key) = {
        let store = new_store(&sai);
        store.reload(None).unwrap();

        let ports = store.get::<PortTraits>();
        let port = ports
            .set_object(PortAdapterHostKey(vec![1, 2, 3, 4]), port_attrs(&[1, 2, 3, 4]))
            .unwrap();
        let bridge = store
            .get::<BridgePortTraits>()
            .set_object(
                BridgePortAdapterHostKey(port.adapter_key()),
                BridgePortAttributes {
                    port_id: port.adapter_key(),
                    admin_state: true,
                    fdb_learning_mode: bridge_port::FDB_LEARNING_MODE_HW,
                },
            )
            .unwrap();

        let sched_attrs = SchedulerAttributes {
            scheduling_type: scheduler::TYPE_WRR,
            scheduling_weight: 4,
            meter_type: scheduler::METER_TYPE_BYTES,
            min_bandwidth_rate: 0,
            max_bandwidth_rate: 0,
        };
        let sched = store
            .get::<SchedulerTraits>()
            .set_object(sched_attrs.clone(), sched_attrs)
            .unwrap();

        let queue_ids = sai
            .get_attribute(
                SaiObjectType::Port,
                port.adapter_key().as_raw(),
                port::QOS_QUEUE_LIST,
            )
            .unwrap();
        let first = QueueSaiId::from_raw(queue_ids.as_object_list().unwrap()[0]).unwrap();
        let queues = store.get::<QueueTraits>();
        let q = queues.load_object_owned_by_adapter(first).unwrap();
        let mut with_sched = q.attributes();
        with_sched.scheduler_profile_id = Some(sched.adapter_key());
        let q = queues
            .set_object(q.adapter_host_key().clone(), with_sched)
            .unwrap();

        let rif = router_interface(&store, 100);
        let nh_attrs = IpNextHopAttributes {
            router_interface: rif.adapter_key(),
            ip: IpAddress::v4(10, 0, 0, 1),
        };
        let nh_key = IpNextHopTraits::adapter_host_key(&nh_attrs);
        let nh = store
            .get::<IpNextHopTraits>()
            .set_object(nh_key, nh_attrs)
            .unwrap();

        let snapshot = store.snapshot();
        snapshot.save(&path).unwrap();
        sai.clear_calls();

        let result = (
            port.adapter_host_key().clone(),
            port.adapter_key(),
            port.attributes(),
            *q.adapter_host_key(),
            q.attributes(),
            *nh.adapter_host_key(),
        );
        store.exit_for_warm_boot();
        drop((port, bridge, sched, q, rif, nh));
        result
    };
    assert_eq!(sai.count_calls(SaiOperation::Remove, SaiObjectType::Port), 0);
    assert!(sai.calls().iter().all(|c| c.operation != SaiOperation::Remove));

    let snapshot = StoreSnapshot::load(&path).unwrap();
    let store = new_store(&sai);
    store.reload(Some(&snapshot)).unwrap();

    let port = store.get::<PortTraits>().get(&port_key).unwrap();
    assert_eq!(port.adapter_key(), port_id);
    assert_eq!(port.attributes(), port_attributes);
    let q = store.get::<QueueTraits>().get(&queue_key).unwrap();
    assert_eq!(q.attributes(), queue_attributes);
    assert!(store
        .get::<BridgePortTraits>()
        .get(&BridgePortAdapterHostKey(port_id))
        .is_some());
    assert!(store.get::<IpNextHopTraits>().get(&nh_key).is_some());
    assert_eq!(store.snapshot(), snapshot);

    // Only queues referenced by the snapshot come back.
    assert_eq!(store.get::<QueueTraits>().len(), 1);
    store.exit_for_warm_boot();
}

#[test]
fn test_next_hop_kinds_split_by_condition() {
    let sai = Arc::new(FakeSai::new());
    let (ip_key, mpls_key) = {
        let store = new_store(&sai);
        store.reload(None).unwrap();
        let rif = router_interface(&store, 200);

        let ip_attrs = IpNextHopAttributes {
            router_interface: rif.adapter_key(),
            ip: IpAddress::v4(10, 0, 0, 2),
        };
        let mpls_attrs = MplsNextHopAttributes {
            router_interface: rif.adapter_key(),
            ip: IpAddress::v4(10, 0, 0, 3),
            label_stack: vec![1001, 2002],
        };
        let ip_key = IpNextHopTraits::adapter_host_key(&ip_attrs);
        let mpls_key = MplsNextHopTraits::adapter_host_key(&mpls_attrs);
        let _ip = store
            .get::<IpNextHopTraits>()
            .set_object(ip_key, ip_attrs)
            .unwrap();
        let _mpls = store
            .get::<MplsNextHopTraits>()
            .set_object(mpls_key.clone(), mpls_attrs)
            .unwrap();
        store.exit_for_warm_boot();
        (ip_key, mpls_key)
    };
    assert_eq!(sai.object_count(SaiObjectType::NextHop), 2);

    let store = new_store(&sai);
    store.reload(None).unwrap();
    let ip_store = store.get::<IpNextHopTraits>();
    let mpls_store = store.get::<MplsNextHopTraits>();
    assert_eq!(ip_store.len(), 1);
    assert_eq!(mpls_store.len(), 1);
    assert!(ip_store.get(&ip_key).is_some());
    assert_eq!(
        mpls_store.get(&mpls_key).unwrap().attributes().label_stack,
        vec![1001, 2002]
    );
    store.exit_for_warm_boot();

    // With the MPLS condition pointed at IP next hops, the MPLS kind picks up
    // the IP next hop instead of its own.
    let store = new_store(&sai);
    store
        .get::<MplsNextHopTraits>()
        .set_condition_attributes(vec![SaiAttribute::new(
            next_hop::TYPE,
            SaiAttributeValue::I32(next_hop::TYPE_IP),
        )]);
    store.reload(None).unwrap();
    let reloaded: Vec<_> = store.get::<MplsNextHopTraits>().iter().collect();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].attributes().ip, IpAddress::v4(10, 0, 0, 2));
    assert!(reloaded[0].attributes().label_stack.is_empty());
    store.exit_for_warm_boot();
}

#[test]
fn test_duplicate_host_key_is_fatal() {
    let sai = Arc::new(FakeSai::new());
    let lanes = SaiAttribute::new(port::HW_LANE_LIST, SaiAttributeValue::U32List(vec![5, 6]));
    let speed = SaiAttribute::new(port::SPEED, SaiAttributeValue::U32(50_000));
    sai.insert_object(SaiObjectType::Port, &[lanes.clone(), speed.clone()]);
    sai.insert_object(SaiObjectType::Port, &[lanes, speed]);

    let store = new_store(&sai);
    let err = store.reload(None).unwrap_err();
    assert!(matches!(err, StoreError::InvariantViolation { kind: "port", .. }));
    assert!(err.is_fatal());

    // Nothing was torn down on the way out.
    assert_eq!(sai.object_count(SaiObjectType::Port), 2);
    assert_eq!(sai.count_calls(SaiOperation::Remove, SaiObjectType::Port), 0);
    store.exit_for_warm_boot();
}

#[test]
fn test_kind_missing_from_snapshot_reloads_empty() {
    let sai = Arc::new(FakeSai::new());
    {
        let store = new_store(&sai);
        let _port = store
            .get::<PortTraits>()
            .set_object(PortAdapterHostKey(vec![1]), port_attrs(&[1]))
            .unwrap();
        store.exit_for_warm_boot();
    }

    let snapshot = StoreSnapshot::from_json(r#"{"virtual_router": []}"#).unwrap();
    let store = new_store(&sai);
    store.reload(Some(&snapshot)).unwrap();
    assert!(store.get::<PortTraits>().is_empty());
    assert_eq!(store.object_count(), 0);
    assert_eq!(sai.object_count(SaiObjectType::Port), 1);
}

#[test]
fn test_release_removes_dependents_first() {
    let sai = Arc::new(FakeSai::with_queues_per_port(0));
    {
        let store = new_store(&sai);
        let port = store
            .get::<PortTraits>()
            .set_object(PortAdapterHostKey(vec![1]), port_attrs(&[1]))
            .unwrap();
        let _bridge = store
            .get::<BridgePortTraits>()
            .set_object(
                BridgePortAdapterHostKey(port.adapter_key()),
                BridgePortAttributes {
                    port_id: port.adapter_key(),
                    admin_state: true,
                    fdb_learning_mode: bridge_port::FDB_LEARNING_MODE_HW,
                },
            )
            .unwrap();
        store.exit_for_warm_boot();
    }

    let store = new_store(&sai);
    store.reload(None).unwrap();
    assert_eq!(store.object_count(), 3);
    sai.clear_calls();
    store.release();

    let removes: Vec<SaiObjectType> = sai
        .calls()
        .into_iter()
        .filter(|c| c.operation == SaiOperation::Remove)
        .map(|c| c.object_type)
        .collect();
    assert_eq!(removes, vec![SaiObjectType::BridgePort, SaiObjectType::Port]);
}

#[test]
fn test_release_unclaimed_after_reload() {
    let sai = Arc::new(FakeSai::with_queues_per_port(0));
    {
        let store = new_store(&sai);
        let _a = store
            .get::<PortTraits>()
            .set_object(PortAdapterHostKey(vec![1]), port_attrs(&[1]))
            .unwrap();
        let _b = store
            .get::<PortTraits>()
            .set_object(PortAdapterHostKey(vec![2]), port_attrs(&[2]))
            .unwrap();
        store.exit_for_warm_boot();
    }

    let store = new_store(&sai);
    store.reload(None).unwrap();
    let claimed = store
        .get::<PortTraits>()
        .get(&PortAdapterHostKey(vec![1]))
        .unwrap();

    // The default virtual router is adapter owned and survives unclaimed.
    assert_eq!(store.release_unclaimed(), 2);
    assert_eq!(sai.object_count(SaiObjectType::Port), 1);
    assert!(sai.exists(claimed.adapter_key().as_raw()));
    assert_eq!(sai.object_count(SaiObjectType::VirtualRouter), 1);
}

#[test]
fn test_release_unclaimed_removes_dependents_first() {
    let sai = Arc::new(FakeSai::with_queues_per_port(0));
    {
        let store = new_store(&sai);
        let port = store
            .get::<PortTraits>()
            .set_object(PortAdapterHostKey(vec![1]), port_attrs(&[1]))
            .unwrap();
        let _bridge = store
            .get::<BridgePortTraits>()
            .set_object(
                BridgePortAdapterHostKey(port.adapter_key()),
                BridgePortAttributes {
                    port_id: port.adapter_key(),
                    admin_state: true,
                    fdb_learning_mode: bridge_port::FDB_LEARNING_MODE_DROP,
                },
            )
            .unwrap();
        store.exit_for_warm_boot();
    }

    let store = new_store(&sai);
    store.reload(None).unwrap();
    sai.clear_calls();
    assert_eq!(store.release_unclaimed(), 3);

    let removes: Vec<SaiObjectType> = sai
        .calls()
        .into_iter()
        .filter(|c| c.operation == SaiOperation::Remove)
        .map(|c| c.object_type)
        .collect();
    assert_eq!(removes, vec![SaiObjectType::BridgePort, SaiObjectType::Port]);
}

#[test]
fn test_queue_owned_by_port_survives_store_release() {
    let sai = Arc::new(FakeSai::with_queues_per_port(1));
    let store = new_store(&sai);
    let port = store
        .get::<PortTraits>()
        .set_object(PortAdapterHostKey(vec![1]), port_attrs(&[1]))
        .unwrap();
    store.get::<QueueTraits>().reload(None).unwrap();
    let queue = store.get::<QueueTraits>().iter().next().unwrap();
    assert_eq!(queue.attributes().queue_type, queue::TYPE_UNICAST);

    drop(queue);
    store.get::<QueueTraits>().release();
    assert_eq!(sai.object_count(SaiObjectType::Queue), 1);
    drop(port);
    assert_eq!(sai.object_count(SaiObjectType::Queue), 0);
}

#[test]
fn test_router_interface_subscribers_see_each_creation_once() {
    let sai = Arc::new(FakeSai::new());
    let store = new_store(&sai);
    store.reload(None).unwrap();

    let created = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&created);
    store
        .get::<RouterInterfaceTraits>()
        .subscribe_after_create(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

    let vlan10 = router_interface(&store, 10);
    assert_eq!(created.load(Ordering::SeqCst), 1);

    let mut smaller_mtu = vlan10.attributes();
    smaller_mtu.mtu = 1500;
    let updated = store
        .get::<RouterInterfaceTraits>()
        .set_object(RouterInterfaceTraits::adapter_host_key(&smaller_mtu), smaller_mtu)
        .unwrap();
    assert!(Arc::ptr_eq(&vlan10, &updated));
    assert_eq!(created.load(Ordering::SeqCst), 1);

    let _vlan20 = router_interface(&store, 20);
    assert_eq!(created.load(Ordering::SeqCst), 2);

    drop(updated);
    drop(vlan10);
    let _vlan10 = router_interface(&store, 10);
    assert_eq!(created.load(Ordering::SeqCst), 3);
    assert_eq!(sai.object_count(SaiObjectType::RouterInterface), 2);
}

#[test]
fn test_reloaded_router_interface_is_not_announced() {
    let sai = Arc::new(FakeSai::new());
    {
        let store = new_store(&sai);
        store.reload(None).unwrap();
        let _rif = router_interface(&store, 10);
        store.exit_for_warm_boot();
    }

    let store = new_store(&sai);
    let created = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&created);
    store
        .get::<RouterInterfaceTraits>()
        .subscribe_after_create(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
    store.reload(None).unwrap();
    let _rif = router_interface(&store, 10);

    assert_eq!(created.load(Ordering::SeqCst), 0);
    assert_eq!(sai.count_calls(SaiOperation::Create, SaiObjectType::RouterInterface), 1);
}
