//! The SAI call boundary.
//!
//! Every hardware interaction of the control plane goes through [`SaiApi`].
//! Production builds back it with the vendor adapter; tests and the agent's
//! standalone mode use [`crate::fake::FakeSai`].

use crate::attribute::{SaiAttrId, SaiAttribute, SaiAttributeValue, SaiStatId};
use crate::error::SaiResult;
use crate::types::{RawSaiObjectId, SaiObjectId, SaiObjectKind, SaiObjectType};
use std::fmt;

/// Generic object api of a SAI adapter.
///
/// All calls are synchronous. Implementations must be usable from several
/// threads since the stats path reads counters while reconciliation runs.
pub trait SaiApi: Send + Sync {
    fn create(
        &self,
        object_type: SaiObjectType,
        attributes: &[SaiAttribute],
    ) -> SaiResult<RawSaiObjectId>;

    fn remove(&self, object_type: SaiObjectType, object_id: RawSaiObjectId) -> SaiResult<()>;

    fn set_attribute(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        attribute: &SaiAttribute,
    ) -> SaiResult<()>;

    fn get_attribute(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        attr_id: SaiAttrId,
    ) -> SaiResult<SaiAttributeValue>;

    /// Enumerates the ids of every live object of a type.
    fn get_object_keys(&self, object_type: SaiObjectType) -> SaiResult<Vec<RawSaiObjectId>>;

    /// Reads counters, returning one value per requested id in order.
    fn get_stats(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        stat_ids: &[SaiStatId],
    ) -> SaiResult<Vec<u64>>;
}

/// Typed conveniences over [`SaiApi`].
pub trait SaiApiExt: SaiApi {
    /// Reads one attribute of a typed object.
    fn get_typed<T: SaiObjectKind>(
        &self,
        object_type: SaiObjectType,
        id: SaiObjectId<T>,
        attr_id: SaiAttrId,
    ) -> SaiResult<SaiAttributeValue> {
        self.get_attribute(object_type, id.as_raw(), attr_id)
    }

    /// Reads several attributes, skipping the ones the object does not carry.
    fn get_attributes(
        &self,
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        attr_ids: &[SaiAttrId],
    ) -> SaiResult<Vec<SaiAttribute>> {
        let mut attrs = Vec::with_capacity(attr_ids.len());
        for &id in attr_ids {
            match self.get_attribute(object_type, object_id, id) {
                Ok(value) => attrs.push(SaiAttribute::new(id, value)),
                Err(crate::SaiError::AttributeNotFound { .. }) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(attrs)
    }
}

impl<A: SaiApi + ?Sized> SaiApiExt for A {}

/// Kind of SAI call, used in error reports and call logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaiOperation {
    Create,
    Remove,
    Set,
    Get,
    GetObjectKeys,
    GetStats,
}

impl fmt::Display for SaiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SaiOperation::Create => "create",
            SaiOperation::Remove => "remove",
            SaiOperation::Set => "set",
            SaiOperation::Get => "get",
            SaiOperation::GetObjectKeys => "get_object_keys",
            SaiOperation::GetStats => "get_stats",
        };
        f.write_str(s)
    }
}
