//! Typed cache of SAI objects.
//!
//! The store maps the logical identity of an object (its *adapter host key*,
//! derived from desired configuration) to the hardware object the adapter
//! created for it (its *adapter key*). It guarantees at most one live
//! hardware object per identity and per kind, turns repeated requests for the
//! same identity into in-place updates, and can rebuild itself from hardware
//! after a warm boot.
//!
//! - [`SaiObjectTraits`]: per-kind description; the kinds live in [`kinds`]
//! - [`SaiObject`]: one hardware object, removed when its last owner drops it
//! - [`ObjectStore`]: the cache for one kind
//! - [`SaiStore`]: all stores, in dependency order
//! - [`StoreSnapshot`]: persisted adapter keys for warm boot
//!
//! # Example
//!
//! ```
//! use sai_api::FakeSai;
//! use sai_store::kinds::{PortAdapterHostKey, PortAttributes, PortTraits};
//! use sai_store::SaiStore;
//! use std::sync::Arc;
//!
//! let store = SaiStore::new(Arc::new(FakeSai::new()));
//! let attrs = PortAttributes {
//!     hw_lane_list: vec![1, 2, 3, 4],
//!     speed: 100_000,
//!     admin_state: true,
//!     fec_mode: 1,
//!     internal_loopback_mode: 0,
//!     media_type: 1,
//!     global_flow_control_mode: 0,
//!     port_vlan_id: 1,
//! };
//! let key = PortAdapterHostKey(vec![1, 2, 3, 4]);
//! let port = store.get::<PortTraits>().set_object(key.clone(), attrs).unwrap();
//! assert!(Arc::ptr_eq(&port, &store.get::<PortTraits>().get(&key).unwrap()));
//! ```

mod decode;
pub mod error;
pub mod kinds;
pub mod object;
pub mod refmap;
pub mod registry;
pub mod snapshot;
pub mod store;
pub mod traits;

pub use error::{SnapshotError, StoreError, StoreResult};
pub use object::SaiObject;
pub use refmap::RefMap;
pub use registry::{SaiStore, StoreMember};
pub use snapshot::StoreSnapshot;
pub use store::{AfterCreateCallback, ObjectStore};
pub use traits::{SaiAdapterOwnedTraits, SaiObjectTraits, SaiPublisherTraits};
