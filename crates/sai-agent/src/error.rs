//! Error types for the entity managers and the switch context.

use sai_store::StoreError;
use switch_types::PortId;
use thiserror::Error;

/// Errors raised while reconciling software state into hardware.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// An add for an entity the manager already holds.
    #[error("port {0} already exists")]
    AlreadyExists(PortId),

    /// A change or remove for an entity the manager does not hold.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// A change would move a port onto different hardware lanes.
    ///
    /// The caller has to remove the port and add it again.
    #[error("port {port} would move from lanes {old:?} to {new:?}")]
    IdentityChanged {
        port: PortId,
        old: Vec<u32>,
        new: Vec<u32>,
    },

    /// A port or queue setting cannot be expressed in SAI terms.
    #[error("invalid port configuration: {0}")]
    InvalidConfig(String),

    /// The platform mapping cannot place a port.
    #[error("platform error: {0}")]
    Platform(String),

    /// The software state saved for warm boot could not be written or read.
    #[error("warm boot state {path}: {message}")]
    WarmBootState { path: String, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ManagerError {
    pub fn port_not_found(port: PortId) -> Self {
        Self::NotFound {
            kind: "port",
            id: port.to_string(),
        }
    }

    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform(message.into())
    }

    /// True for store invariant violations, which the agent cannot recover from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_fatal())
    }
}

/// Result type for manager operations.
pub type ManagerResult<T> = std::result::Result<T, ManagerError>;

/// Errors loading or validating the agent configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
