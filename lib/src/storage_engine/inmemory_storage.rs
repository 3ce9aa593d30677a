// lib/src/storage_engine/inmemory_storage.rs
use super::storage_engine::StorageEngine;
use super::types::{BatchOp, BatchOutcome, CasOutcome, WriteBatch};
use async_trait::async_trait;
use models::errors::RendezvousResult;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Volatile engine for tests and dry runs. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStorage {
    entries: Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl StorageEngine for InMemoryStorage {
    async fn connect(&self) -> RendezvousResult<()> {
        Ok(())
    }

    async fn insert(&self, key: &[u8], value: &[u8]) -> RendezvousResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    async fn retrieve(&self, key: &[u8]) -> RendezvousResult<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn delete(&self, key: &[u8]) -> RendezvousResult<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn flush(&self) -> RendezvousResult<()> {
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &[u8]) -> RendezvousResult<Vec<(Vec<u8>, Vec<u8>)>> {
        let entries = self.entries.read().await;
        Ok(entries
            .range::<[u8], _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn compare_and_swap(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new: Option<&[u8]>,
    ) -> RendezvousResult<CasOutcome> {
        let mut entries = self.entries.write().await;
        let current = entries.get(key).map(Vec::as_slice);
        if current != expected {
            return Ok(CasOutcome::Conflict {
                current: current.map(<[u8]>::to_vec),
            });
        }
        match new {
            Some(value) => {
                entries.insert(key.to_vec(), value.to_vec());
            }
            None => {
                entries.remove(key);
            }
        }
        Ok(CasOutcome::Swapped)
    }

    async fn apply_batch(&self, batch: WriteBatch) -> RendezvousResult<BatchOutcome> {
        // A single write guard covers the checks and the writes.
        let mut entries = self.entries.write().await;
        for op in batch.ops() {
            if let Some(expected) = op.expected() {
                if entries.get(op.key()).map(Vec::as_slice) != Some(expected) {
                    return Ok(BatchOutcome::Conflict { key: op.key().to_vec() });
                }
            }
        }
        for op in batch.into_ops() {
            match op {
                BatchOp::Insert { key, value } | BatchOp::Replace { key, value, .. } => {
                    entries.insert(key, value);
                }
                BatchOp::Remove { key } => {
                    entries.remove(&key);
                }
            }
        }
        Ok(BatchOutcome::Applied)
    }

    fn get_type(&self) -> &'static str {
        "InMemory"
    }
}
