// lib/src/storage_engine/sled_storage.rs
use std::path::Path;

use async_trait::async_trait;
use log::{debug, error, info};
use models::errors::{RendezvousError, RendezvousResult};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Db;

use super::storage_engine::StorageEngine;
use super::types::{BatchOp, BatchOutcome, CasOutcome, WriteBatch};
use crate::config::StorageConfig;

/// Opens (creating if needed) the sled database under `path`.
pub fn open_sled_db(path: &Path, config: &StorageConfig) -> RendezvousResult<Db> {
    if path.exists() && !path.is_dir() {
        error!("Path {:?} exists but is not a directory", path);
        return Err(RendezvousError::StorageError(format!("Path {:?} is not a directory", path)));
    }
    std::fs::create_dir_all(path).map_err(|e| {
        error!("Failed to create database directory at {:?}: {}", path, e);
        RendezvousError::StorageError(format!("Failed to create database directory at {:?}: {}", path, e))
    })?;

    info!("Opening Sled database at {:?}", path);
    sled::Config::new()
        .path(path)
        .use_compression(config.use_compression)
        .cache_capacity(config.cache_capacity)
        .open()
        .map_err(|e| {
            error!("Failed to open Sled database at {:?}: {}", path, e);
            RendezvousError::StorageError(format!(
                "Failed to open Sled database at {:?}: {}. Ensure the directory is accessible.",
                path, e
            ))
        })
}

/// Durable engine backed by a single sled tree.
#[derive(Debug, Clone)]
pub struct SledStorage {
    db: Db,
}

impl SledStorage {
    pub fn new(db: Db) -> Self {
        SledStorage { db }
    }

    pub fn open(config: &StorageConfig) -> RendezvousResult<Self> {
        let db = open_sled_db(&config.data_directory, config)?;
        Ok(Self::new(db))
    }
}

#[async_trait]
impl StorageEngine for SledStorage {
    async fn connect(&self) -> RendezvousResult<()> {
        // Opening the Db already validated the path.
        Ok(())
    }

    async fn insert(&self, key: &[u8], value: &[u8]) -> RendezvousResult<()> {
        self.db.insert(key, value)?;
        Ok(())
    }

    async fn retrieve(&self, key: &[u8]) -> RendezvousResult<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|ivec| ivec.to_vec()))
    }

    async fn delete(&self, key: &[u8]) -> RendezvousResult<()> {
        self.db.remove(key)?;
        Ok(())
    }

    async fn flush(&self) -> RendezvousResult<()> {
        let bytes = self.db.flush_async().await?;
        debug!("Flushed {} bytes to disk", bytes);
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &[u8]) -> RendezvousResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let mut entries = Vec::new();
        for item in self.db.scan_prefix(prefix) {
            let (key, value) = item?;
            entries.push((key.to_vec(), value.to_vec()));
        }
        Ok(entries)
    }

    async fn compare_and_swap(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new: Option<&[u8]>,
    ) -> RendezvousResult<CasOutcome> {
        match self.db.compare_and_swap(key, expected, new)? {
            Ok(()) => Ok(CasOutcome::Swapped),
            Err(conflict) => Ok(CasOutcome::Conflict {
                current: conflict.current.map(|ivec| ivec.to_vec()),
            }),
        }
    }

    async fn apply_batch(&self, batch: WriteBatch) -> RendezvousResult<BatchOutcome> {
        let result: Result<(), TransactionError<Vec<u8>>> = self.db.transaction(|tx| {
            for op in batch.ops() {
                if let Some(expected) = op.expected() {
                    if tx.get(op.key())?.as_deref() != Some(expected) {
                        return Err(ConflictableTransactionError::Abort(op.key().to_vec()));
                    }
                }
                match op {
                    BatchOp::Insert { key, value } | BatchOp::Replace { key, value, .. } => {
                        tx.insert(key.as_slice(), value.as_slice())?;
                    }
                    BatchOp::Remove { key } => {
                        tx.remove(key.as_slice())?;
                    }
                }
            }
            Ok(())
        });
        match result {
            Ok(()) => Ok(BatchOutcome::Applied),
            Err(TransactionError::Abort(key)) => {
                debug!("Batch aborted on stale key {}", String::from_utf8_lossy(&key));
                Ok(BatchOutcome::Conflict { key })
            }
            Err(TransactionError::Storage(e)) => Err(e.into()),
        }
    }

    fn get_type(&self) -> &'static str {
        "Sled"
    }
}
