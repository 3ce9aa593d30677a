// lib/src/config/config_helpers.rs

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use models::errors::{RendezvousError, RendezvousResult};
use serde_yaml2 as serde_yaml;

use super::config_defaults::{default_config_path, DATA_DIRECTORY_ENV_VAR};
use super::config_structs::AppConfig;

/// Loads the application config.
///
/// An explicit `path` must exist. Without one, `rendezvous_config.yaml` in
/// the working directory is used when present, defaults otherwise.
/// `RENDEZVOUS_DATA_DIR` overrides the data directory in both cases.
pub fn load_config(path: Option<&Path>) -> RendezvousResult<AppConfig> {
    load_config_with_default(path, &default_config_path())
}

fn load_config_with_default(path: Option<&Path>, default_path: &Path) -> RendezvousResult<AppConfig> {
    let mut config = match path {
        Some(path) => parse_config_file(path)?,
        None if default_path.exists() => parse_config_file(default_path)?,
        None => {
            info!("No config file at {:?}, using defaults", default_path);
            AppConfig::default()
        }
    };

    if let Ok(dir) = env::var(DATA_DIRECTORY_ENV_VAR) {
        if !dir.trim().is_empty() {
            debug!("Data directory overridden by {}: {}", DATA_DIRECTORY_ENV_VAR, dir);
            config.storage.data_directory = PathBuf::from(dir);
        }
    }
    Ok(config)
}

pub fn parse_config_file(path: &Path) -> RendezvousResult<AppConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        RendezvousError::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    debug!("Raw YAML content from {:?}:\n{}", path, content);
    parse_config_str(&content)
        .map_err(|e| RendezvousError::ConfigError(format!("Failed to parse config file {}: {}", path.display(), e)))
}

pub fn parse_config_str(content: &str) -> Result<AppConfig, String> {
    let cleaned_content = content
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .collect::<Vec<&str>>()
        .join("\n");

    if cleaned_content.is_empty() {
        return Ok(AppConfig::default());
    }
    serde_yaml::from_str::<AppConfig>(&cleaned_content).map_err(|e| e.to_string())
}
