//! Error types for the object store.

use sai_api::{SaiAttrId, SaiError, SaiObjectType, SaiOperation};
use std::path::PathBuf;
use thiserror::Error;

/// Object store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A SAI call made on behalf of the store failed.
    #[error("{operation} on {object_type}{} rejected by hardware: {source}", attribute_suffix(.attribute))]
    HardwareRejected {
        object_type: SaiObjectType,
        operation: SaiOperation,
        attribute: Option<SaiAttrId>,
        #[source]
        source: SaiError,
    },

    /// The cache no longer agrees with hardware. Not recoverable.
    #[error("object store invariant violated for {kind}: {message}")]
    InvariantViolation { kind: &'static str, message: String },

    /// Persisting or loading a snapshot failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// An attribute list read back from hardware could not be decoded.
    #[error("invalid attribute {attribute} on {object_type}: {reason}")]
    InvalidAttribute {
        object_type: SaiObjectType,
        attribute: SaiAttrId,
        reason: &'static str,
    },
}

fn attribute_suffix(attribute: &Option<SaiAttrId>) -> String {
    attribute.map_or_else(String::new, |id| format!(" (attribute {id})"))
}

impl StoreError {
    pub fn hardware(
        object_type: SaiObjectType,
        operation: SaiOperation,
        attribute: Option<SaiAttrId>,
        source: SaiError,
    ) -> Self {
        StoreError::HardwareRejected {
            object_type,
            operation,
            attribute,
            source,
        }
    }

    pub fn invariant(kind: &'static str, message: impl Into<String>) -> Self {
        StoreError::InvariantViolation {
            kind,
            message: message.into(),
        }
    }

    /// True for errors the agent must not continue past.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::InvariantViolation { .. })
    }
}

/// Snapshot persistence errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to access snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Format(#[from] serde_json::Error),
}

/// Result type for object store operations.
pub type StoreResult<T> = Result<T, StoreError>;
