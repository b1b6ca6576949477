//! The object kinds tracked by the store, in dependency order.

macro_rules! sai_object_kind {
    ($(#[$meta:meta])* $name:ident, $kind_name:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl sai_api::SaiObjectKind for $name {
            fn type_name() -> &'static str {
                $kind_name
            }
        }
    };
}

pub mod bridge_port;
pub mod next_hop;
pub mod port;
pub mod queue;
pub mod router_interface;
pub mod scheduler;
pub mod virtual_router;

pub use bridge_port::{
    BridgePortAdapterHostKey, BridgePortAttributes, BridgePortSaiId, BridgePortTraits, SaiBridgePort,
};
pub use next_hop::{
    IpNextHopAdapterHostKey, IpNextHopAttributes, IpNextHopSaiId, IpNextHopTraits,
    MplsNextHopAdapterHostKey, MplsNextHopAttributes, MplsNextHopSaiId, MplsNextHopTraits,
    SaiIpNextHop, SaiMplsNextHop,
};
pub use port::{PortAdapterHostKey, PortAttributes, PortSaiId, PortTraits, SaiPort};
pub use queue::{QueueAdapterHostKey, QueueAttributes, QueueSaiId, QueueTraits, SaiQueue};
pub use router_interface::{
    RouterInterfaceAdapterHostKey, RouterInterfaceAttributes, RouterInterfaceSaiId,
    RouterInterfaceTraits, SaiRouterInterface,
};
pub use scheduler::{SaiScheduler, SchedulerAttributes, SchedulerSaiId, SchedulerTraits};
pub use virtual_router::{
    SaiVirtualRouter, VirtualRouterAttributes, VirtualRouterSaiId, VirtualRouterTraits,
};
