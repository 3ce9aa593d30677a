// lib/src/storage_engine/storage_engine.rs

use std::fmt::Debug;

use async_trait::async_trait;
use models::errors::RendezvousResult;

use super::types::{BatchOutcome, CasOutcome, WriteBatch};

/// Ordered key-value engine holding the document collections.
///
/// Keys are `<collection>/<id>` byte strings and values are encoded
/// documents. Engines must make `compare_and_swap` and `apply_batch` atomic.
#[async_trait]
pub trait StorageEngine: Send + Sync + Debug {
    async fn connect(&self) -> RendezvousResult<()>;
    async fn insert(&self, key: &[u8], value: &[u8]) -> RendezvousResult<()>;
    async fn retrieve(&self, key: &[u8]) -> RendezvousResult<Option<Vec<u8>>>;
    async fn delete(&self, key: &[u8]) -> RendezvousResult<()>;
    async fn flush(&self) -> RendezvousResult<()>;

    /// All entries whose key starts with `prefix`, in key order.
    async fn scan_prefix(&self, prefix: &[u8]) -> RendezvousResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Replaces the value at `key` only if it still equals `expected`
    /// (`None` meaning absent). A `new` of `None` removes the key.
    async fn compare_and_swap(
        &self,
        key: &[u8],
        expected: Option<&[u8]>,
        new: Option<&[u8]>,
    ) -> RendezvousResult<CasOutcome>;

    /// Applies every op or none. When a `Replace` finds a different value
    /// the batch is dropped and the conflicting key reported.
    async fn apply_batch(&self, batch: WriteBatch) -> RendezvousResult<BatchOutcome>;

    fn get_type(&self) -> &'static str;
}
