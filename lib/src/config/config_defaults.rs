// lib/src/config/config_defaults.rs

use std::path::PathBuf;

use super::config_structs::StorageEngineType;

pub const DEFAULT_CONFIG_FILE_NAME: &str = "rendezvous_config.yaml";
pub const DEFAULT_DATA_DIRECTORY: &str = "./data/rendezvous";
pub const DATA_DIRECTORY_ENV_VAR: &str = "RENDEZVOUS_DATA_DIR";
pub const DEFAULT_CACHE_CAPACITY: u64 = 64 * 1024 * 1024;
pub const DEFAULT_MAX_TRANSACTION_RETRIES: u32 = 5;
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub fn default_storage_engine_type() -> StorageEngineType { StorageEngineType::Sled }
pub fn default_data_directory() -> PathBuf { PathBuf::from(DEFAULT_DATA_DIRECTORY) }
pub fn default_cache_capacity() -> u64 { DEFAULT_CACHE_CAPACITY }
pub fn default_use_compression() -> bool { false }
pub fn default_max_transaction_retries() -> u32 { DEFAULT_MAX_TRANSACTION_RETRIES }
pub fn default_log_level() -> String { DEFAULT_LOG_LEVEL.to_string() }
pub fn default_config_path() -> PathBuf { PathBuf::from(DEFAULT_CONFIG_FILE_NAME) }
