//! Request fingerprinting for idempotent retries.

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use store::{IdempotencyRecord, TransactionStore};

use crate::error::{CheckoutError, Result};

/// Rewrites `value` with every object's keys in sorted order.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let sorted: Map<String, Value> = keys
                .into_iter()
                .map(|k| (k.clone(), canonicalize(&map[k])))
                .collect();
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// SHA-256 hex digest of the canonical JSON form of `request`.
pub fn request_hash<T: Serialize>(request: &T) -> Result<String> {
    let canonical = canonicalize(&serde_json::to_value(request)?);
    let digest = Sha256::digest(serde_json::to_string(&canonical)?.as_bytes());
    Ok(hex::encode(digest))
}

/// Looks up a prior response for `key`.
///
/// Returns the stored record when the fingerprints match, and
/// [`CheckoutError::IdempotencyConflict`] when the key was used for a
/// different request.
pub async fn find_prior<S>(store: &S, key: &str, hash: &str) -> Result<Option<IdempotencyRecord>>
where
    S: TransactionStore + ?Sized,
{
    match store.get_idempotency_record(key).await? {
        Some(record) if record.request_hash != hash => Err(CheckoutError::IdempotencyConflict),
        other => Ok(other),
    }
}
