//! Node configuration with TOML file support.

use crate::NodeError;
use meridian_types::{ChainParams, NetworkId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a Meridian node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). CLI flags and environment
/// variables override file values in the daemon.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Which network to participate in.
    #[serde(default)]
    pub network: NetworkId,

    /// Data directory (node key storage).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Hex-encoded proposer private key. When absent, a dev account is
    /// used on the dev network and the persisted node key elsewhere.
    #[serde(default)]
    pub proposer_key: Option<String>,

    /// Protocol parameters (fixed by genesis, not read from TOML).
    #[serde(skip)]
    pub params: ChainParams,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./meridian_data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            network: NetworkId::Dev,
            data_dir: default_data_dir(),
            proposer_key: None,
            params: ChainParams::default(),
            log_level: default_log_level(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, NodeError> {
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| NodeError::Config(e.to_string()))
    }
}
