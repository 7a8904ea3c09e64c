//! Liveness endpoint.

use axum::Json;
use domain::UCP_VERSION;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ucp_version: &'static str,
}

/// GET /health
///
/// Reports liveness and the protocol version this server negotiates.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ucp_version: UCP_VERSION,
    })
}
