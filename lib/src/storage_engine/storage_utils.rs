// lib/src/storage_engine/storage_utils.rs

use log::warn;
use models::errors::{RendezvousError, RendezvousResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub const KEY_SEPARATOR: u8 = b'/';

/// Key of a document: `<collection>/<id>`.
pub fn document_key(collection: &str, id: &str) -> Vec<u8> {
    let mut key = collection_prefix(collection);
    key.extend_from_slice(id.as_bytes());
    key
}

pub fn collection_prefix(collection: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(collection.len() + 1);
    prefix.extend_from_slice(collection.as_bytes());
    prefix.push(KEY_SEPARATOR);
    prefix
}

/// Id part of a document key, given the collection prefix length.
pub fn id_from_key(key: &[u8], prefix_len: usize) -> RendezvousResult<String> {
    let raw = key.get(prefix_len..).unwrap_or_default();
    String::from_utf8(raw.to_vec())
        .map_err(|e| RendezvousError::DeserializationError(format!("Document key is not UTF-8: {}", e)))
}

pub fn encode_document<T: Serialize>(document: &T) -> RendezvousResult<Vec<u8>> {
    serde_json::to_vec(document)
        .map_err(|e| RendezvousError::SerializationError(format!("Failed to encode document: {}", e)))
}

/// Decodes a stored document. The key's id is authoritative: it is filled in
/// when the body lacks one and replaces an embedded id that disagrees.
pub fn decode_document<T: DeserializeOwned>(id: &str, bytes: &[u8]) -> RendezvousResult<T> {
    let mut value: Value = serde_json::from_slice(bytes)
        .map_err(|e| RendezvousError::DeserializationError(format!("Document {} is not valid JSON: {}", id, e)))?;
    if let Value::Object(fields) = &mut value {
        let key_id = Value::String(id.to_string());
        match fields.get("id") {
            Some(embedded) if *embedded == key_id => {}
            Some(embedded) => {
                warn!("Document {} embeds id {}, using the key's id", id, embedded);
                fields.insert("id".to_string(), key_id);
            }
            None => {
                fields.insert("id".to_string(), key_id);
            }
        }
    }
    serde_json::from_value(value)
        .map_err(|e| RendezvousError::DeserializationError(format!("Document {} has an unexpected shape: {}", id, e)))
}
