//! HTTP route handlers.

pub mod checkouts;
pub mod discovery;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod testing;
pub mod version;

/// Header carrying the idempotency key of a mutating request.
pub const IDEMPOTENCY_KEY: &str = "idempotency-key";

/// Structured header identifying the calling platform.
pub const UCP_AGENT: &str = "ucp-agent";

/// Header guarding the `/testing` endpoints.
pub const SIMULATION_SECRET: &str = "simulation-secret";

pub(crate) fn header_str<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Fallback for paths no route matches.
pub async fn not_found() -> crate::error::ApiError {
    crate::error::ApiError::NotFound("Not Found".to_string())
}
