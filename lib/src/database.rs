// lib/src/database.rs

use std::sync::Arc;

use log::{debug, error, warn};
use models::errors::{RendezvousError, RendezvousResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{StorageConfig, DEFAULT_MAX_TRANSACTION_RETRIES};
use crate::storage_engine::storage_utils::{
    collection_prefix, decode_document, document_key, encode_document, id_from_key,
};
use crate::storage_engine::{create_storage, BatchOutcome, CasOutcome, StorageEngine, WriteBatch};

pub const APPOINTMENTS: &str = "appointments";
pub const ESTABLISHMENTS: &str = "establishments";
pub const STAFF: &str = "staff";

/// A document database wrapper that provides typed collections on top of
/// an underlying `StorageEngine`.
#[derive(Debug, Clone)]
pub struct Database {
    storage_engine: Arc<dyn StorageEngine>,
    max_retries: u32,
}

impl Database {
    /// Creates a new database instance based on the provided storage configuration.
    pub async fn new(config: &StorageConfig) -> RendezvousResult<Self> {
        let storage_engine = create_storage(config)?;
        storage_engine.connect().await?;
        Ok(Self::with_engine(storage_engine))
    }

    pub fn with_engine(storage_engine: Arc<dyn StorageEngine>) -> Self {
        Database {
            storage_engine,
            max_retries: DEFAULT_MAX_TRANSACTION_RETRIES,
        }
    }

    /// Bounds the number of attempts `update` makes. Zero is read as one.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns a reference to the underlying storage engine.
    pub fn storage(&self) -> &Arc<dyn StorageEngine> {
        &self.storage_engine
    }

    pub async fn get<T: DeserializeOwned>(&self, collection: &str, id: &str) -> RendezvousResult<Option<T>> {
        match self.storage_engine.retrieve(&document_key(collection, id)).await? {
            Some(bytes) => decode_document(id, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Like `get`, but a missing document is `NotFound`.
    pub async fn fetch<T: DeserializeOwned>(&self, collection: &str, id: &str) -> RendezvousResult<T> {
        self.get(collection, id)
            .await?
            .ok_or_else(|| RendezvousError::NotFound(format!("{}/{}", collection, id)))
    }

    /// Unconditional write.
    pub async fn put<T: Serialize + Sync>(&self, collection: &str, id: &str, document: &T) -> RendezvousResult<()> {
        let bytes = encode_document(document)?;
        self.storage_engine.insert(&document_key(collection, id), &bytes).await
    }

    /// Writes a document only if no document exists under `id` yet.
    pub async fn insert_new<T: Serialize + Sync>(&self, collection: &str, id: &str, document: &T) -> RendezvousResult<()> {
        let bytes = encode_document(document)?;
        let outcome = self
            .storage_engine
            .compare_and_swap(&document_key(collection, id), None, Some(&bytes))
            .await?;
        match outcome {
            CasOutcome::Swapped => Ok(()),
            CasOutcome::Conflict { .. } => Err(RendezvousError::TransactionError(format!(
                "document {}/{} already exists",
                collection, id
            ))),
        }
    }

    pub async fn delete(&self, collection: &str, id: &str) -> RendezvousResult<()> {
        self.storage_engine.delete(&document_key(collection, id)).await
    }

    /// Every document of a collection with its own decode result, in key order.
    pub async fn scan_decoded<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> RendezvousResult<Vec<(String, RendezvousResult<T>)>> {
        Ok(self
            .scan_snapshots(collection)
            .await?
            .into_iter()
            .map(|(id, _, document)| (id, document))
            .collect())
    }

    /// Like `scan_decoded`, also keeping the stored bytes each document was
    /// decoded from, for guarding a later batch write.
    pub async fn scan_snapshots<T: DeserializeOwned>(
        &self,
        collection: &str,
    ) -> RendezvousResult<Vec<(String, Vec<u8>, RendezvousResult<T>)>> {
        let prefix = collection_prefix(collection);
        let entries = self.storage_engine.scan_prefix(&prefix).await?;
        let mut decoded = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let id = match id_from_key(&key, prefix.len()) {
                Ok(id) => id,
                Err(e) => {
                    decoded.push((String::from_utf8_lossy(&key).into_owned(), value, Err(e)));
                    continue;
                }
            };
            let document = decode_document(&id, &value);
            decoded.push((id, value, document));
        }
        Ok(decoded)
    }

    /// Every decodable document of a collection. Others are logged and skipped.
    pub async fn scan<T: DeserializeOwned>(&self, collection: &str) -> RendezvousResult<Vec<T>> {
        let mut documents = Vec::new();
        for (id, document) in self.scan_decoded(collection).await? {
            match document {
                Ok(document) => documents.push(document),
                Err(e) => warn!("Skipping undecodable document {}/{}: {}", collection, id, e),
            }
        }
        Ok(documents)
    }

    /// Optimistic read-modify-write of one document.
    ///
    /// `mutate` runs against a fresh snapshot on every attempt, so it may be
    /// called more than once. Only the attempt whose swap succeeds is kept.
    /// An error from `mutate` aborts without writing.
    pub async fn update<T, F>(&self, collection: &str, id: &str, mut mutate: F) -> RendezvousResult<T>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnMut(&mut T) -> RendezvousResult<()> + Send,
    {
        let key = document_key(collection, id);
        for attempt in 1..=self.max_retries {
            let snapshot = self
                .storage_engine
                .retrieve(&key)
                .await?
                .ok_or_else(|| RendezvousError::NotFound(format!("{}/{}", collection, id)))?;
            let mut document: T = decode_document(id, &snapshot)?;
            mutate(&mut document)?;
            let bytes = encode_document(&document)?;

            match self
                .storage_engine
                .compare_and_swap(&key, Some(&snapshot), Some(&bytes))
                .await?
            {
                CasOutcome::Swapped => return Ok(document),
                CasOutcome::Conflict { current } => {
                    if current.is_none() {
                        return Err(RendezvousError::NotFound(format!("{}/{}", collection, id)));
                    }
                    debug!(
                        "Concurrent write on {}/{}, retrying (attempt {}/{})",
                        collection, id, attempt, self.max_retries
                    );
                }
            }
        }
        error!("Giving up on {}/{} after {} conflicting attempts", collection, id, self.max_retries);
        Err(RendezvousError::TransactionError(format!(
            "document {}/{} kept changing after {} attempts",
            collection, id, self.max_retries
        )))
    }

    pub async fn apply_batch(&self, batch: WriteBatch) -> RendezvousResult<BatchOutcome> {
        if batch.is_empty() {
            return Ok(BatchOutcome::Applied);
        }
        self.storage_engine.apply_batch(batch).await
    }

    pub async fn flush(&self) -> RendezvousResult<()> {
        self.storage_engine.flush().await
    }
}
