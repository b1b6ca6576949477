//! Typed reads out of SAI attribute lists.

use crate::error::{StoreError, StoreResult};
use sai_api::{RawSaiObjectId, SaiAttrId, SaiAttribute, SaiAttributeValue, SaiObjectType};
use switch_types::{IpAddress, MacAddress};

pub(crate) struct AttrReader<'a> {
    object_type: SaiObjectType,
    attrs: &'a [SaiAttribute],
}

macro_rules! typed_reads {
    ($($name:ident, $opt_name:ident => $accessor:ident -> $ty:ty;)*) => {
        $(
            pub(crate) fn $name(&self, id: SaiAttrId) -> StoreResult<$ty> {
                self.$opt_name(id)?.ok_or(self.invalid(id, "missing"))
            }

            #[allow(dead_code)]
            pub(crate) fn $opt_name(&self, id: SaiAttrId) -> StoreResult<Option<$ty>> {
                match self.get(id) {
                    None => Ok(None),
                    Some(value) => value
                        .$accessor()
                        .map(|v| Some(v.to_owned()))
                        .ok_or(self.invalid(id, "unexpected value type")),
                }
            }
        )*
    };
}

impl<'a> AttrReader<'a> {
    pub(crate) fn new(object_type: SaiObjectType, attrs: &'a [SaiAttribute]) -> Self {
        Self { object_type, attrs }
    }

    fn get(&self, id: SaiAttrId) -> Option<&'a SaiAttributeValue> {
        sai_api::attribute::find_attribute(self.attrs, id)
    }

    fn invalid(&self, attribute: SaiAttrId, reason: &'static str) -> StoreError {
        StoreError::InvalidAttribute {
            object_type: self.object_type,
            attribute,
            reason,
        }
    }

    typed_reads! {
        bool, opt_bool => as_bool -> bool;
        u16, opt_u16 => as_u16 -> u16;
        u32, opt_u32 => as_u32 -> u32;
        u64, opt_u64 => as_u64 -> u64;
        i32, opt_i32 => as_i32 -> i32;
        mac, opt_mac => as_mac -> MacAddress;
        ip, opt_ip => as_ip -> IpAddress;
        object_id, opt_object_id => as_object_id -> RawSaiObjectId;
        u32_list, opt_u32_list => as_u32_list -> Vec<u32>;
    }
}
