//! Port deltas applied through `SaiSwitch` against the fake adapter.

use pretty_assertions::assert_eq;
use sai_agent::{
    AgentConfig, LaneProfile, ManagerError, PlatformConfig, PlatformPortConfig, PortQueue,
    SaiQueueConfig, SaiSwitch, SwPort, SwitchState,
};
use sai_api::{FakeSai, SaiApi, SaiObjectType, SaiOperation};
use sai_store::kinds::{PortSaiId, PortTraits};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use switch_types::{
    AdminState, PortId, PortSpeed, QueueScheduling, StreamType, TransmitterTechnology,
};
use tempfile::TempDir;

const QUEUES: u32 = 8;

fn config(dir: &TempDir) -> AgentConfig {
    let mut config = AgentConfig::default();
    config.switch.state_dir = dir.path().to_path_buf();
    config.platform = PlatformConfig {
        queues_per_port: QUEUES,
        ports: (0..4)
            .map(|i| PlatformPortConfig {
                id: PortId(i + 1),
                transmitter_technology: TransmitterTechnology::Optical,
                profiles: vec![
                    LaneProfile {
                        speed: PortSpeed::GE_100,
                        lanes: (i * 4..i * 4 + 4).collect(),
                    },
                    LaneProfile {
                        speed: PortSpeed::GE_25,
                        lanes: vec![i * 4],
                    },
                ],
            })
            .collect(),
    };
    config
}

fn sw_port(id: u32) -> SwPort {
    let mut port = SwPort::new(PortId(id), format!("eth0/{}/1", id));
    port.admin_state = AdminState::Enabled;
    port.speed = PortSpeed::GE_100;
    port.queues = vec![PortQueue::unicast(0), PortQueue::unicast(1)];
    port
}

fn state(ids: &[u32]) -> SwitchState {
    let mut state = SwitchState::new();
    for &id in ids {
        state.upsert_port(sw_port(id));
    }
    state
}

fn booted(sai: &Arc<FakeSai>, dir: &TempDir) -> SaiSwitch {
    let mut switch = SaiSwitch::new(Arc::clone(sai) as Arc<dyn SaiApi>, config(dir));
    switch.init(false).unwrap();
    switch
}

#[test]
fn test_added_port_creates_port_bridge_port_and_queues() {
    let sai = Arc::new(FakeSai::with_queues_per_port(QUEUES));
    let dir = TempDir::new().unwrap();
    let mut switch = booted(&sai, &dir);

    switch.apply_state(state(&[1])).unwrap();

    assert_eq!(sai.object_count(SaiObjectType::Port), 1);
    assert_eq!(sai.object_count(SaiObjectType::BridgePort), 1);
    assert_eq!(sai.object_count(SaiObjectType::Queue), QUEUES as usize);

    let handle = switch.port_manager().get_port_handle(PortId(1)).unwrap();
    assert_eq!(handle.port.attributes().hw_lane_list, vec![0, 1, 2, 3]);
    assert_eq!(handle.queues.len(), QUEUES as usize);
    assert_eq!(
        handle.bridge_port.attributes().port_id,
        handle.port.adapter_key()
    );
    assert_eq!(
        switch.port_id(handle.port.adapter_key()),
        Some(PortId(1))
    );
    assert_eq!(switch.indices().port_count(), 1);

    // Only the two configured queues get a scheduler.
    let ports = switch.port_manager();
    for index in 0..2 {
        let queue = ports
            .get_queue_handle(PortId(1), &SaiQueueConfig::new(StreamType::Unicast, index))
            .unwrap();
        let scheduler = queue.scheduler.as_ref().unwrap();
        assert_eq!(
            queue.queue.attributes().scheduler_profile_id,
            Some(scheduler.adapter_key())
        );
    }
    let idle = ports
        .get_queue_handle(PortId(1), &SaiQueueConfig::new(StreamType::Unicast, 5))
        .unwrap();
    assert!(idle.scheduler.is_none());
    assert_eq!(idle.queue.attributes().scheduler_profile_id, None);
    assert!(ports
        .get_queue_handle(PortId(1), &SaiQueueConfig::new(StreamType::Unicast, QUEUES))
        .is_none());
}

#[test]
fn test_removed_port_leaves_index_before_hardware() {
    let sai = Arc::new(FakeSai::with_queues_per_port(QUEUES));
    let dir = TempDir::new().unwrap();
    let mut switch = booted(&sai, &dir);
    switch.apply_state(state(&[1, 2])).unwrap();

    let indices = Arc::clone(switch.indices());
    let stale = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&stale);
    sai.set_remove_hook(move |object_type, raw| {
        if object_type != SaiObjectType::Port {
            return;
        }
        if indices.port_id(PortSaiId::from_raw_unchecked(raw)).is_some() {
            seen.fetch_add(1, Ordering::SeqCst);
        }
    });

    switch.apply_state(state(&[2])).unwrap();

    assert_eq!(sai.count_calls(SaiOperation::Remove, SaiObjectType::Port), 1);
    assert_eq!(stale.load(Ordering::SeqCst), 0);
    assert_eq!(switch.indices().port_count(), 1);
    assert!(switch.port_manager().get_port_handle(PortId(1)).is_none());
    assert_eq!(sai.object_count(SaiObjectType::BridgePort), 1);
}

#[test]
fn test_changed_port_updates_in_place() {
    let sai = Arc::new(FakeSai::with_queues_per_port(QUEUES));
    let dir = TempDir::new().unwrap();
    let mut switch = booted(&sai, &dir);
    switch.apply_state(state(&[1])).unwrap();
    let before = switch
        .port_manager()
        .get_port_handle(PortId(1))
        .unwrap()
        .port
        .adapter_key();
    sai.clear_calls();

    let mut next = state(&[1]);
    let mut port = sw_port(1);
    port.admin_state = AdminState::Disabled;
    port.queues[1].scheduling = QueueScheduling::StrictPriority;
    next.upsert_port(port);
    switch.apply_state(next).unwrap();

    assert_eq!(sai.count_calls(SaiOperation::Create, SaiObjectType::Port), 0);
    assert_eq!(sai.count_calls(SaiOperation::Set, SaiObjectType::Port), 1);
    let handle = switch.port_manager().get_port_handle(PortId(1)).unwrap();
    assert_eq!(handle.port.adapter_key(), before);
    assert!(!handle.port.attributes().admin_state);
    // Queue 0 keeps the default scheduler, queue 1 gets a strict one.
    assert_eq!(sai.object_count(SaiObjectType::Scheduler), 2);
}

#[test]
fn test_speed_change_moving_lanes_is_rejected() {
    let sai = Arc::new(FakeSai::with_queues_per_port(QUEUES));
    let dir = TempDir::new().unwrap();
    let mut switch = booted(&sai, &dir);
    switch.apply_state(state(&[1])).unwrap();

    let mut next = SwitchState::new();
    let mut port = sw_port(1);
    port.speed = PortSpeed::GE_25;
    next.upsert_port(port);

    let err = switch.apply_state(next).unwrap_err();
    assert!(matches!(err, ManagerError::IdentityChanged { port: PortId(1), .. }));
    assert!(!err.is_fatal());
    assert_eq!(sai.object_count(SaiObjectType::Port), 1);
}

#[test]
fn test_unknown_platform_port_is_rejected() {
    let sai = Arc::new(FakeSai::with_queues_per_port(QUEUES));
    let dir = TempDir::new().unwrap();
    let mut switch = booted(&sai, &dir);

    let err = switch.apply_state(state(&[9])).unwrap_err();
    assert!(matches!(err, ManagerError::Platform(_)));
    assert_eq!(sai.object_count(SaiObjectType::Port), 0);
}

#[test]
fn test_warm_boot_round_trip_creates_nothing() {
    let sai = Arc::new(FakeSai::with_queues_per_port(QUEUES));
    let dir = TempDir::new().unwrap();
    let applied = state(&[1, 2, 3]);

    let mut before = booted(&sai, &dir);
    before.apply_state(applied.clone()).unwrap();
    let port_keys: Vec<_> = before
        .store()
        .get::<PortTraits>()
        .iter()
        .map(|p| p.adapter_key())
        .collect();
    before.exit_for_warm_boot().unwrap();
    drop(before);
    assert_eq!(sai.object_count(SaiObjectType::Port), 3);
    sai.clear_calls();

    let mut after = SaiSwitch::new(Arc::clone(&sai) as Arc<dyn SaiApi>, config(&dir));
    let recovered = after.init(true).unwrap().unwrap();
    assert_eq!(recovered, applied);
    after.apply_state(recovered).unwrap();

    for object_type in [
        SaiObjectType::Port,
        SaiObjectType::BridgePort,
        SaiObjectType::Scheduler,
    ] {
        assert_eq!(sai.count_calls(SaiOperation::Create, object_type), 0);
        assert_eq!(sai.count_calls(SaiOperation::Remove, object_type), 0);
    }
    for key in port_keys {
        assert!(after.port_id(key).is_some());
    }

    after.shutdown();
    assert_eq!(sai.object_count(SaiObjectType::Port), 0);
    assert!(!dir.path().join("sai_store.json").exists());
}

#[test]
fn test_lane_change_after_warm_boot_is_rejected() {
    let sai = Arc::new(FakeSai::with_queues_per_port(QUEUES));
    let dir = TempDir::new().unwrap();
    let mut before = booted(&sai, &dir);
    before.apply_state(state(&[1])).unwrap();
    before.exit_for_warm_boot().unwrap();
    drop(before);

    let mut after = SaiSwitch::new(Arc::clone(&sai) as Arc<dyn SaiApi>, config(&dir));
    after.init(true).unwrap();
    assert_eq!(after.applied_state(), &state(&[1]));

    let mut next = SwitchState::new();
    let mut port = sw_port(1);
    port.speed = PortSpeed::GE_25;
    next.upsert_port(port);
    let err = after.apply_state(next).unwrap_err();

    assert!(matches!(err, ManagerError::IdentityChanged { port: PortId(1), .. }));
    assert_eq!(sai.count_calls(SaiOperation::Create, SaiObjectType::Port), 1);
    assert_eq!(sai.object_count(SaiObjectType::Port), 1);
}
