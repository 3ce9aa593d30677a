// lib/src/config/config_structs.rs

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use models::errors::RendezvousError;
use serde::{Deserialize, Serialize};

use super::config_defaults::*;
use super::config_serializers::storage_engine_type_serde;

/// Enum for the supported storage engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageEngineType {
    Sled,
    #[serde(alias = "in_memory", alias = "memory")]
    InMemory,
}

impl FromStr for StorageEngineType {
    type Err = RendezvousError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sled" => Ok(StorageEngineType::Sled),
            "inmemory" | "in_memory" | "memory" => Ok(StorageEngineType::InMemory),
            _ => Err(RendezvousError::ConfigError(format!("Unknown storage engine type: {}", s))),
        }
    }
}

impl fmt::Display for StorageEngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageEngineType::Sled => f.write_str("sled"),
            StorageEngineType::InMemory => f.write_str("inmemory"),
        }
    }
}

/// Mirrors the `storage:` block of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_engine_type", with = "storage_engine_type_serde")]
    pub storage_engine_type: StorageEngineType,
    #[serde(default = "default_data_directory")]
    pub data_directory: PathBuf,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    #[serde(default = "default_use_compression")]
    pub use_compression: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            storage_engine_type: default_storage_engine_type(),
            data_directory: default_data_directory(),
            cache_capacity: default_cache_capacity(),
            use_compression: default_use_compression(),
        }
    }
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        StorageConfig {
            storage_engine_type: StorageEngineType::InMemory,
            ..StorageConfig::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Attempts of one optimistic read-modify-write before giving up.
    #[serde(default = "default_max_transaction_retries")]
    pub max_transaction_retries: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        LifecycleConfig {
            max_transaction_retries: default_max_transaction_retries(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig { level: default_log_level() }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub log: LogConfig,
}
