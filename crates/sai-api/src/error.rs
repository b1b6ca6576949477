//! Errors returned across the SAI call boundary.

use crate::types::{RawSaiObjectId, SaiObjectType};
use std::fmt;
use thiserror::Error;

/// Failure statuses an adapter reports (`sai_status_t`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaiStatus {
    Failure,
    NotSupported,
    InvalidParameter,
    ItemAlreadyExists,
    ItemNotFound,
    TableFull,
    MandatoryAttributeMissing,
    InvalidObjectId,
    InvalidAttribute,
}

impl SaiStatus {
    /// Symbolic SAI name, as adapters log it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Failure => "SAI_STATUS_FAILURE",
            Self::NotSupported => "SAI_STATUS_NOT_SUPPORTED",
            Self::InvalidParameter => "SAI_STATUS_INVALID_PARAMETER",
            Self::ItemAlreadyExists => "SAI_STATUS_ITEM_ALREADY_EXISTS",
            Self::ItemNotFound => "SAI_STATUS_ITEM_NOT_FOUND",
            Self::TableFull => "SAI_STATUS_TABLE_FULL",
            Self::MandatoryAttributeMissing => "SAI_STATUS_MANDATORY_ATTRIBUTE_MISSING",
            Self::InvalidObjectId => "SAI_STATUS_INVALID_OBJECT_ID",
            Self::InvalidAttribute => "SAI_STATUS_INVALID_ATTRIBUTE",
        }
    }
}

impl fmt::Display for SaiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaiError {
    /// The adapter rejected the call with `status`.
    #[error("SAI call failed: {status}")]
    Status { status: SaiStatus },

    #[error("{object_type} 0x{object_id:016x} not found")]
    ObjectNotFound {
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
    },

    /// The object exists but does not carry the requested attribute.
    #[error("attribute {attr_id} not set on {object_type} 0x{object_id:016x}")]
    AttributeNotFound {
        object_type: SaiObjectType,
        object_id: RawSaiObjectId,
        attr_id: u32,
    },

    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },
}

impl SaiError {
    pub fn from_status(status: SaiStatus) -> Self {
        SaiError::Status { status }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        SaiError::InvalidParameter {
            message: message.into(),
        }
    }
}

pub type SaiResult<T> = Result<T, SaiError>;
