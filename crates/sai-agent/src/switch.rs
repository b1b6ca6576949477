//! SaiSwitch - the agent context for one switch.
//!
//! Owns the SAI api handle, the store registry, the managers and the
//! cross-reference index, and drives the switch lifecycle:
//!
//! - `init`: reload the stores (from the warm-boot snapshot or from
//!   hardware), claim the default virtual router and, on warm boot, replay
//!   the state applied before the restart
//! - `apply_state`: reconcile the next desired state
//! - `exit_for_warm_boot`: persist the snapshot and the applied state, then
//!   let go of every object without touching hardware
//! - `shutdown`: remove everything the agent programmed

use crate::config::AgentConfig;
use crate::error::{ManagerError, ManagerResult};
use crate::indices::ConcurrentIndices;
use crate::manager_table::SaiManagerTable;
use crate::port_manager::SaiPortManager;
use crate::state::{DeltaEntry, StateDelta, SwitchState};
use log::{debug, info, warn};
use sai_api::SaiApi;
use sai_store::kinds::{PortSaiId, PortTraits, RouterInterfaceTraits};
use sai_store::{SaiStore, StoreSnapshot};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use switch_types::PortId;

/// File next to the snapshot holding the applied software state.
pub const SWITCH_STATE_FILE: &str = "switch_state.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootType {
    Cold,
    Warm,
}

#[derive(Debug)]
pub struct SaiSwitch {
    // Managers drop before the store they reference.
    managers: SaiManagerTable,
    store: Arc<SaiStore>,
    indices: Arc<ConcurrentIndices>,
    config: AgentConfig,
    applied: SwitchState,
    boot_type: Option<BootType>,
    unclaimed_pending: bool,
}

impl SaiSwitch {
    pub fn new(api: Arc<dyn SaiApi>, config: AgentConfig) -> Self {
        let store = Arc::new(SaiStore::new(api));
        let indices = Arc::new(ConcurrentIndices::new());
        let managers = SaiManagerTable::new(
            Arc::clone(&store),
            Arc::new(config.platform.clone()),
            Arc::clone(&indices),
            &config.switch,
        );

        store
            .get::<PortTraits>()
            .subscribe_after_create(|port| debug!("port {} created", port.adapter_key()));
        store
            .get::<RouterInterfaceTraits>()
            .subscribe_after_create(|rif| debug!("router interface {} created", rif.adapter_key()));

        Self {
            managers,
            store,
            indices,
            config,
            applied: SwitchState::new(),
            boot_type: None,
            unclaimed_pending: false,
        }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.config.switch.snapshot_path()
    }

    fn switch_state_path(&self) -> PathBuf {
        self.config.switch.state_dir.join(SWITCH_STATE_FILE)
    }

    /// Rebuilds the stores and claims adapter-owned objects.
    ///
    /// On warm boot the software state applied before the restart is
    /// replayed onto the reloaded objects, becomes the applied state and is
    /// returned. Without a warm-boot snapshot the stores are reloaded from
    /// hardware.
    pub fn init(&mut self, warm_boot: bool) -> ManagerResult<Option<SwitchState>> {
        let snapshot_path = self.snapshot_path();
        let (boot_type, recovered) = if warm_boot && snapshot_path.exists() {
            let snapshot = StoreSnapshot::load(&snapshot_path)?;
            self.store.reload(Some(&snapshot))?;
            let recovered = load_switch_state(&self.switch_state_path())?;
            (BootType::Warm, recovered)
        } else {
            if warm_boot {
                warn!(
                    "no warm boot snapshot at {}, reloading from hardware",
                    snapshot_path.display()
                );
            }
            self.store.reload(None)?;
            (BootType::Cold, None)
        };

        self.managers.claim_default_virtual_router(&self.store)?;
        if let Some(state) = &recovered {
            // Matches the reloaded objects, so nothing is programmed.
            self.reconcile(state.clone())?;
        }
        self.boot_type = Some(boot_type);
        self.unclaimed_pending = true;
        info!(
            "{:?} boot complete with {} objects in the store",
            boot_type,
            self.store.object_count()
        );
        Ok(recovered)
    }

    /// Reconciles hardware with `new`.
    ///
    /// The first call after `init` also drops reloaded objects the new state
    /// did not claim.
    ///
    /// On error the applied state holds the ports that did reach hardware,
    /// so applying `new` again retries only what is left.
    pub fn apply_state(&mut self, new: SwitchState) -> ManagerResult<StateDelta> {
        let delta = self.reconcile(new)?;

        if self.unclaimed_pending {
            self.unclaimed_pending = false;
            let released = self.store.release_unclaimed();
            if released > 0 {
                info!("removed {} objects not claimed after boot", released);
            }
        }
        Ok(delta)
    }

    fn reconcile(&mut self, new: SwitchState) -> ManagerResult<StateDelta> {
        let delta = StateDelta::new(&self.applied, &new);
        if !delta.is_empty() {
            info!("applying {} port changes", delta.ports_delta().len());
        }

        let applied = &mut self.applied;
        let mut done = 0;
        let result = self.managers.port_manager_mut().process_port_delta_with(
            delta.ports_delta(),
            |entry| {
                match entry {
                    DeltaEntry::Added(port) | DeltaEntry::Changed { new: port, .. } => {
                        applied.upsert_port(port.clone());
                    }
                    DeltaEntry::Removed(port) => {
                        applied.remove_port(port.id);
                    }
                }
                done += 1;
            },
        );
        if let Err(e) = result {
            warn!(
                "port changes stopped after {} of {}: {}",
                done,
                delta.ports_delta().len(),
                e
            );
            return Err(e);
        }
        self.applied = new;
        Ok(delta)
    }

    /// Saves the snapshot and the applied state, then forgets every object
    /// while leaving hardware programmed.
    pub fn exit_for_warm_boot(&mut self) -> ManagerResult<()> {
        let snapshot = self.store.snapshot();
        snapshot.save(&self.snapshot_path())?;
        save_switch_state(&self.switch_state_path(), &self.applied)?;

        self.store.exit_for_warm_boot();
        self.managers.reset();
        info!(
            "exited for warm boot, {} objects left in hardware",
            snapshot.object_count()
        );
        Ok(())
    }

    /// Removes everything the agent programmed.
    pub fn shutdown(&mut self) {
        self.managers.reset();
        self.store.release();
        self.applied = SwitchState::new();
        // A stale snapshot must not be picked up by a later warm boot.
        for path in [self.snapshot_path(), self.switch_state_path()] {
            match fs::remove_file(&path) {
                Ok(()) => debug!("removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("failed to remove {}: {}", path.display(), e),
            }
        }
        info!("switch shut down");
    }

    /// Collects counters of every port.
    pub fn update_stats(&mut self) -> ManagerResult<()> {
        self.managers.port_manager_mut().update_stats()
    }

    pub fn boot_type(&self) -> Option<BootType> {
        self.boot_type
    }

    pub fn applied_state(&self) -> &SwitchState {
        &self.applied
    }

    pub fn store(&self) -> &Arc<SaiStore> {
        &self.store
    }

    pub fn indices(&self) -> &Arc<ConcurrentIndices> {
        &self.indices
    }

    pub fn port_manager(&self) -> &SaiPortManager {
        self.managers.port_manager()
    }

    pub fn port_manager_mut(&mut self) -> &mut SaiPortManager {
        self.managers.port_manager_mut()
    }

    /// Software port behind a hardware port, as seen by the stats path.
    pub fn port_id(&self, port_key: PortSaiId) -> Option<PortId> {
        self.indices.port_id(port_key)
    }
}

fn save_switch_state(path: &Path, state: &SwitchState) -> ManagerResult<()> {
    let error = |message: String| ManagerError::WarmBootState {
        path: path.display().to_string(),
        message,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| error(e.to_string()))?;
    }
    let json = serde_json::to_string_pretty(state).map_err(|e| error(e.to_string()))?;
    fs::write(path, json).map_err(|e| error(e.to_string()))
}

fn load_switch_state(path: &Path) -> ManagerResult<Option<SwitchState>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("no saved switch state at {}", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(ManagerError::WarmBootState {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
    };
    SwitchState::from_json(&json)
        .map(Some)
        .map_err(|e| ManagerError::WarmBootState {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}
