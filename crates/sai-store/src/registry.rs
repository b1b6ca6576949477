//! The registry of all object stores.

use crate::error::StoreResult;
use crate::kinds::{
    BridgePortTraits, IpNextHopTraits, MplsNextHopTraits, PortTraits, QueueTraits,
    RouterInterfaceTraits, SchedulerTraits, VirtualRouterTraits,
};
use crate::snapshot::StoreSnapshot;
use crate::store::ObjectStore;
use crate::traits::SaiObjectTraits;
use log::info;
use sai_api::{SaiApi, SaiObjectKind};
use std::fmt;
use std::sync::Arc;

/// Kinds held by [`SaiStore`].
pub trait StoreMember: SaiObjectTraits {
    fn store(registry: &SaiStore) -> &ObjectStore<Self>;
}

macro_rules! store_members {
    ($($traits:ty => $field:ident),* $(,)?) => {
        /// One [`ObjectStore`] per object kind.
        ///
        /// Stores are listed in dependency order: an object only references
        /// objects of kinds listed before its own.
        pub struct SaiStore {
            api: Arc<dyn SaiApi>,
            $($field: ObjectStore<$traits>,)*
        }

        impl SaiStore {
            pub fn new(api: Arc<dyn SaiApi>) -> Self {
                Self {
                    $($field: ObjectStore::new(Arc::clone(&api)),)*
                    api,
                }
            }

            /// Reloads every store in dependency order.
            ///
            /// With a snapshot each store reloads its own shard; a kind absent
            /// from the snapshot reloads empty. Without one every store
            /// enumerates hardware.
            pub fn reload(&self, snapshot: Option<&StoreSnapshot>) -> StoreResult<()> {
                match snapshot {
                    Some(s) => info!("reloading object stores from snapshot ({} objects)", s.object_count()),
                    None => info!("reloading object stores from hardware"),
                }
                $(
                    let shard = snapshot.map(|s| {
                        s.keys(<$traits as SaiObjectKind>::type_name()).unwrap_or(&[])
                    });
                    self.$field.reload(shard)?;
                )*
                Ok(())
            }

            /// Snapshot of every store.
            pub fn snapshot(&self) -> StoreSnapshot {
                let mut snapshot = StoreSnapshot::new();
                $(
                    snapshot.insert(
                        <$traits as SaiObjectKind>::type_name(),
                        self.$field.snapshot(),
                    );
                )*
                snapshot
            }

            /// Number of live objects across all stores.
            pub fn object_count(&self) -> usize {
                0 $(+ self.$field.len())*
            }
        }

        impl fmt::Debug for SaiStore {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct("SaiStore")
                    $(.field(stringify!($field), &self.$field.len()))*
                    .finish()
            }
        }

        $(
            impl StoreMember for $traits {
                fn store(registry: &SaiStore) -> &ObjectStore<Self> {
                    &registry.$field
                }
            }
        )*
    };
}

store_members! {
    VirtualRouterTraits => virtual_router,
    PortTraits => port,
    BridgePortTraits => bridge_port,
    SchedulerTraits => scheduler,
    QueueTraits => queue,
    RouterInterfaceTraits => router_interface,
    IpNextHopTraits => ip_next_hop,
    MplsNextHopTraits => mpls_next_hop,
}

impl SaiStore {
    /// The store of kind `T`.
    pub fn get<T: StoreMember>(&self) -> &ObjectStore<T> {
        T::store(self)
    }

    pub fn api(&self) -> &Arc<dyn SaiApi> {
        &self.api
    }

    /// Drops warm-boot handles nobody claimed after the first reconciliation,
    /// dependents first.
    pub fn release_unclaimed(&self) -> usize {
        self.mpls_next_hop.release_unclaimed()
            + self.ip_next_hop.release_unclaimed()
            + self.router_interface.release_unclaimed()
            + self.queue.release_unclaimed()
            + self.scheduler.release_unclaimed()
            + self.bridge_port.release_unclaimed()
            + self.port.release_unclaimed()
            + self.virtual_router.release_unclaimed()
    }

    /// Releases every store, dependents first.
    pub fn release(&self) {
        self.mpls_next_hop.release();
        self.ip_next_hop.release();
        self.router_interface.release();
        self.queue.release();
        self.scheduler.release();
        self.bridge_port.release();
        self.port.release();
        self.virtual_router.release();
    }

    /// Leaves every object in hardware and empties the stores, dependents first.
    pub fn exit_for_warm_boot(&self) {
        self.mpls_next_hop.exit_for_warm_boot();
        self.ip_next_hop.exit_for_warm_boot();
        self.router_interface.exit_for_warm_boot();
        self.queue.exit_for_warm_boot();
        self.scheduler.exit_for_warm_boot();
        self.bridge_port.exit_for_warm_boot();
        self.port.exit_for_warm_boot();
        self.virtual_router.exit_for_warm_boot();
    }
}
