//! Per-kind object traits.
//!
//! Every kind of SAI object cached by the store is a zero-sized marker type
//! implementing [`SaiObjectTraits`]. The trait fixes the SAI object type, the
//! logical identity used as cache key, and the attribute set with its
//! mapping to and from SAI attribute lists.

use crate::error::StoreResult;
use sai_api::{SaiAttrId, SaiAttribute, SaiObjectKind, SaiObjectType, SaiStatId};
use std::fmt::Debug;
use std::hash::Hash;

/// Compile-time description of one object kind.
///
/// The kind name returned by [`SaiObjectKind::type_name`] doubles as the
/// snapshot shard name and must be unique across kinds.
pub trait SaiObjectTraits: SaiObjectKind + Sized {
    /// SAI object type the kind lives under. Two kinds may share one type.
    const OBJECT_TYPE: SaiObjectType;

    /// Attributes read back from hardware to rebuild an object on reload.
    const ATTRIBUTE_IDS: &'static [SaiAttrId];

    /// Counters collected for the kind; empty when it exposes none.
    const STATS: &'static [SaiStatId] = &[];

    /// Objects created by the adapter itself are never removed by the store.
    const ADAPTER_OWNED: bool = false;

    /// Logical identity, derived only from desired configuration.
    type AdapterHostKey: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Everything needed to create or update the object.
    type CreateAttributes: Clone + PartialEq + Debug + Send + Sync + 'static;

    fn to_sai_attributes(attrs: &Self::CreateAttributes) -> Vec<SaiAttribute>;

    fn from_sai_attributes(attrs: &[SaiAttribute]) -> StoreResult<Self::CreateAttributes>;

    fn adapter_host_key(attrs: &Self::CreateAttributes) -> Self::AdapterHostKey;

    /// Attribute values an enumerated object must carry to belong to this kind.
    fn condition_attributes() -> Vec<SaiAttribute> {
        Vec::new()
    }
}

/// Kinds whose creation is published to subscribers.
pub trait SaiPublisherTraits: SaiObjectTraits {}

/// Kinds created autonomously by the adapter.
///
/// Implementors must set [`SaiObjectTraits::ADAPTER_OWNED`].
pub trait SaiAdapterOwnedTraits: SaiObjectTraits {}
