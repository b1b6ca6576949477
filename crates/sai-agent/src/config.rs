//! Agent configuration file.
//!
//! Loaded from TOML. Default location: /etc/sai-agent/agent.toml
//!
//! ```toml
//! [switch]
//! state_dir = "/var/lib/sai-agent"
//!
//! [platform]
//! queues_per_port = 8
//!
//! [[platform.ports]]
//! id = 1
//! transmitter_technology = "optical"
//! profiles = [{ speed = 100000, lanes = [1, 2, 3, 4] }]
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::platform::PlatformConfig;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/sai-agent/agent.toml";

/// Switch-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchSettings {
    /// Directory holding the warm-boot snapshot.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// File name of the warm-boot snapshot inside `state_dir`.
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: String,

    /// Whether bridge ports learn MAC addresses in hardware.
    #[serde(default = "default_fdb_learning")]
    pub fdb_learning: bool,
}

/// Complete agent configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub switch: SwitchSettings,

    #[serde(default)]
    pub platform: PlatformConfig,
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("/var/lib/sai-agent")
}

fn default_snapshot_file() -> String {
    "sai_store.json".to_string()
}

fn default_fdb_learning() -> bool {
    true
}

impl Default for SwitchSettings {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            snapshot_file: default_snapshot_file(),
            fdb_learning: default_fdb_learning(),
        }
    }
}

impl SwitchSettings {
    pub fn snapshot_path(&self) -> PathBuf {
        self.state_dir.join(&self.snapshot_file)
    }
}

impl AgentConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("config file {} not found, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.switch.snapshot_file.is_empty() {
            return Err(ConfigError::Invalid(
                "snapshot_file must not be empty".to_string(),
            ));
        }
        self.platform.validate()
    }
}
