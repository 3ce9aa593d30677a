// lib/src/storage_engine/mod.rs

// Module declarations
pub mod inmemory_storage;
pub mod sled_storage;
pub mod storage_engine;
pub mod storage_utils;
pub mod types;

// Re-export key types and traits for external use
pub use inmemory_storage::InMemoryStorage;
pub use sled_storage::{open_sled_db, SledStorage};
pub use storage_engine::StorageEngine;
pub use types::{BatchOp, BatchOutcome, CasOutcome, WriteBatch};

use std::sync::Arc;

use log::info;
use models::errors::RendezvousResult;

use crate::config::{StorageConfig, StorageEngineType};

/// Creates a storage engine instance based on the provided configuration.
///
/// Sled is the default engine. InMemory keeps nothing past the process.
pub fn create_storage(config: &StorageConfig) -> RendezvousResult<Arc<dyn StorageEngine>> {
    info!("Creating {} storage engine", config.storage_engine_type);
    match config.storage_engine_type {
        StorageEngineType::Sled => Ok(Arc::new(SledStorage::open(config)?) as Arc<dyn StorageEngine>),
        StorageEngineType::InMemory => Ok(Arc::new(InMemoryStorage::new()) as Arc<dyn StorageEngine>),
    }
}
