// lib/src/config/config_serializers.rs

use std::str::FromStr;

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

use super::config_structs::StorageEngineType;

/// Reads and writes the engine type as a plain YAML scalar such as `sled`.
pub mod storage_engine_type_serde {
    use super::*;

    pub fn serialize<S>(engine_type: &StorageEngineType, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&engine_type.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<StorageEngineType, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        // Quoted values reach us with their quotes on some YAML inputs.
        let sanitized = raw.trim().trim_matches(|c| c == '"' || c == '\'');
        StorageEngineType::from_str(sanitized).map_err(D::Error::custom)
    }
}
