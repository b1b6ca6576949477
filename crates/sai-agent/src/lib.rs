//! Switch agent programming SAI objects from software port state.
//!
//! The agent keeps a [`SwitchState`] describing the desired ports and their
//! queues. Every new state is diffed against the applied one and the
//! resulting [`PortsDelta`] is handed to the entity managers, which turn it
//! into SAI objects through the store:
//!
//! - [`SaiPortManager`]: ports, their bridge ports and queues
//! - [`SaiQueueManager`]: queue configuration
//! - [`SaiSchedulerManager`]: schedulers shared by equally configured queues
//! - [`SaiBridgeManager`]: bridge ports
//!
//! [`SaiSwitch`] owns the store and the managers and drives cold boot, warm
//! boot and shutdown.

pub mod bridge_manager;
pub mod config;
pub mod error;
pub mod indices;
pub mod manager_table;
pub mod platform;
pub mod port_manager;
pub mod queue_manager;
pub mod scheduler_manager;
pub mod state;
pub mod switch;

pub use bridge_manager::SaiBridgeManager;
pub use config::{AgentConfig, SwitchSettings, DEFAULT_CONFIG_PATH};
pub use error::{ConfigError, ConfigResult, ManagerError, ManagerResult};
pub use indices::ConcurrentIndices;
pub use manager_table::SaiManagerTable;
pub use platform::{LaneProfile, PlatformConfig, PlatformPortConfig};
pub use port_manager::{
    HwPortStats, PortManagerStats, SaiPortHandle, SaiPortManager, SaiPortManagerCallbacks,
};
pub use queue_manager::{SaiQueueConfig, SaiQueueHandle, SaiQueueHandles, SaiQueueManager};
pub use scheduler_manager::SaiSchedulerManager;
pub use state::{
    DeltaEntry, PortQueue, PortQueueRate, PortsDelta, RateUnit, StateDelta, SwPort, SwitchState,
};
pub use switch::{BootType, SaiSwitch, SWITCH_STATE_FILE};
