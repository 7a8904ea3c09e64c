use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A response remembered under a client-supplied idempotency key.
///
/// `request_hash` fingerprints the request that produced the response so
/// that reuse of the key with a different body can be detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub key: String,
    pub request_hash: String,
    pub response_status: u16,
    pub response_body: String,
}

/// One row of the request audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub url: String,
    pub checkout_id: Option<String>,
    pub payload: Option<Value>,
}

impl RequestLogEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            method: method.into(),
            url: url.into(),
            checkout_id: None,
            payload: None,
        }
    }

    /// Associates the entry with a checkout session.
    pub fn with_checkout_id(mut self, checkout_id: impl Into<String>) -> Self {
        self.checkout_id = Some(checkout_id.into());
        self
    }

    /// Attaches the request payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}
