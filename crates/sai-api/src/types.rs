//! Type-safe SAI object IDs and object types.
//!
//! Adapter keys are opaque 64-bit handles chosen by the SAI adapter. Wrapping
//! them in [`SaiObjectId`] keeps a port id from being passed where a queue id
//! is expected.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Raw SAI object ID type (matches sai_object_id_t in C).
pub type RawSaiObjectId = u64;

/// SAI_NULL_OBJECT_ID.
pub const SAI_NULL_OBJECT_ID: RawSaiObjectId = 0;

/// Marker trait for SAI object kinds.
///
/// Each kind of object tracked by the control plane is a zero-sized type
/// implementing this trait, so that ids of different kinds never mix.
pub trait SaiObjectKind: Send + Sync + 'static {
    /// Returns the kind name for logs and debug output.
    fn type_name() -> &'static str;
}

/// A type-safe SAI object ID.
///
/// # Examples
///
/// ```
/// use sai_api::{SaiObjectId, SaiObjectKind};
///
/// struct RouterKind;
///
/// impl SaiObjectKind for RouterKind {
///     fn type_name() -> &'static str {
///         "VirtualRouter"
///     }
/// }
///
/// let router = SaiObjectId::<RouterKind>::from_raw(0x3_0000_0000_0001).unwrap();
/// assert_eq!(router.as_raw(), 0x3_0000_0000_0001);
/// assert!(SaiObjectId::<RouterKind>::from_raw(0).is_none());
/// ```
pub struct SaiObjectId<T: SaiObjectKind> {
    raw: RawSaiObjectId,
    _marker: PhantomData<fn() -> T>,
}

impl<T: SaiObjectKind> SaiObjectId<T> {
    /// The null object ID (SAI_NULL_OBJECT_ID).
    pub const NULL: Self = Self {
        raw: SAI_NULL_OBJECT_ID,
        _marker: PhantomData,
    };

    /// Creates a new object ID from a raw value.
    ///
    /// Returns `None` if the raw value is the null object ID.
    pub fn from_raw(raw: RawSaiObjectId) -> Option<Self> {
        if raw == SAI_NULL_OBJECT_ID {
            None
        } else {
            Some(Self::from_raw_unchecked(raw))
        }
    }

    /// Creates a new object ID from a raw value, including null.
    pub const fn from_raw_unchecked(raw: RawSaiObjectId) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    pub const fn as_raw(&self) -> RawSaiObjectId {
        self.raw
    }

    pub const fn is_null(&self) -> bool {
        self.raw == SAI_NULL_OBJECT_ID
    }
}

// Hand-written so that kind markers need no Clone/Eq/Hash bounds.
impl<T: SaiObjectKind> Clone for SaiObjectId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: SaiObjectKind> Copy for SaiObjectId<T> {}

impl<T: SaiObjectKind> fmt::Debug for SaiObjectId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:016x})", T::type_name(), self.raw)
    }
}

impl<T: SaiObjectKind> fmt::Display for SaiObjectId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.raw)
    }
}

impl<T: SaiObjectKind> PartialEq for SaiObjectId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T: SaiObjectKind> Eq for SaiObjectId<T> {}

impl<T: SaiObjectKind> PartialOrd for SaiObjectId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: SaiObjectKind> Ord for SaiObjectId<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl<T: SaiObjectKind> Hash for SaiObjectId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: SaiObjectKind> Default for SaiObjectId<T> {
    fn default() -> Self {
        Self::NULL
    }
}

/// SAI object types known to this control plane.
///
/// Discriminants follow `sai_object_type_t`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SaiObjectType {
    Port = 1,
    VirtualRouter = 3,
    NextHop = 4,
    RouterInterface = 6,
    Queue = 21,
    Scheduler = 22,
    Switch = 33,
    BridgePort = 58,
}

impl SaiObjectType {
    pub const ALL: [SaiObjectType; 8] = [
        SaiObjectType::Port,
        SaiObjectType::VirtualRouter,
        SaiObjectType::NextHop,
        SaiObjectType::RouterInterface,
        SaiObjectType::Queue,
        SaiObjectType::Scheduler,
        SaiObjectType::Switch,
        SaiObjectType::BridgePort,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SaiObjectType::Port => "SAI_OBJECT_TYPE_PORT",
            SaiObjectType::VirtualRouter => "SAI_OBJECT_TYPE_VIRTUAL_ROUTER",
            SaiObjectType::NextHop => "SAI_OBJECT_TYPE_NEXT_HOP",
            SaiObjectType::RouterInterface => "SAI_OBJECT_TYPE_ROUTER_INTERFACE",
            SaiObjectType::Queue => "SAI_OBJECT_TYPE_QUEUE",
            SaiObjectType::Scheduler => "SAI_OBJECT_TYPE_SCHEDULER",
            SaiObjectType::Switch => "SAI_OBJECT_TYPE_SWITCH",
            SaiObjectType::BridgePort => "SAI_OBJECT_TYPE_BRIDGE_PORT",
        }
    }

    /// Recovers the object type encoded in the upper bits of an object id.
    ///
    /// Adapters built on this crate encode the type at bit 48 and up, the
    /// same way `sai_object_type_query` works on common vendor SDKs.
    pub fn query(raw: RawSaiObjectId) -> Option<SaiObjectType> {
        let tag = (raw >> OBJECT_TYPE_SHIFT) as u32;
        Self::ALL.into_iter().find(|t| *t as u32 == tag)
    }

    /// Builds an object id of this type from a per-type sequence number.
    pub const fn make_id(&self, seq: u64) -> RawSaiObjectId {
        ((*self as u64) << OBJECT_TYPE_SHIFT) | (seq & OBJECT_SEQ_MASK)
    }
}

impl fmt::Display for SaiObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const OBJECT_TYPE_SHIFT: u32 = 48;
const OBJECT_SEQ_MASK: u64 = (1 << OBJECT_TYPE_SHIFT) - 1;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[derive(Debug)]
    struct QueueKind;

    impl SaiObjectKind for QueueKind {
        fn type_name() -> &'static str {
            "Queue"
        }
    }

    #[test]
    fn test_null_oid() {
        type QueueOid = SaiObjectId<QueueKind>;
        assert!(QueueOid::from_raw(0).is_none());
        assert!(QueueOid::NULL.is_null());
        assert_eq!(QueueOid::default(), QueueOid::NULL);
    }

    #[test]
    fn test_oid_debug_names_kind() {
        let queue = SaiObjectId::<QueueKind>::from_raw(0x15_0000_0000_0003).unwrap();
        let debug = format!("{:?}", queue);
        assert!(debug.starts_with("Queue("));
        assert!(debug.contains("0x0015000000000003"));
    }

    #[test]
    fn test_oid_hash_and_order() {
        let a = SaiObjectId::<QueueKind>::from_raw_unchecked(2);
        let b = SaiObjectId::<QueueKind>::from_raw_unchecked(1);
        let set: HashSet<_> = [a, b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(b < a);
    }

    #[test]
    fn test_object_type_query_round_trip() {
        for object_type in SaiObjectType::ALL {
            let id = object_type.make_id(7);
            assert_eq!(SaiObjectType::query(id), Some(object_type));
            assert_eq!(id & OBJECT_SEQ_MASK, 7);
        }
        assert_eq!(SaiObjectType::query(0), None);
    }
}
