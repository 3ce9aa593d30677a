// lib/src/config/mod.rs

pub mod config_defaults;
pub mod config_helpers;
pub mod config_serializers;
pub mod config_structs;

pub use config_defaults::*;
pub use config_helpers::{load_config, parse_config_file, parse_config_str};
pub use config_structs::{AppConfig, LifecycleConfig, LogConfig, StorageConfig, StorageEngineType};
