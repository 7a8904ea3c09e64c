//! Endpoints for driving order lifecycle in tests and demos.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use common::OrderId;
use serde::Serialize;
use store::MerchantStore;

use super::{SIMULATION_SECRET, header_str};
use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub status: &'static str,
}

/// POST /testing/simulate-shipping/{id}
///
/// Requires the `Simulation-Secret` header to match the configured secret.
pub async fn simulate_shipping<S: MerchantStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<SimulationResponse>, ApiError> {
    if header_str(&headers, SIMULATION_SECRET) != Some(state.simulation_secret.as_str()) {
        tracing::warn!(order_id = %id, "rejected shipping simulation with invalid secret");
        return Err(ApiError::Forbidden("Invalid Simulation Secret".to_string()));
    }

    state.checkouts.ship_order(&OrderId::from(id)).await?;
    Ok(Json(SimulationResponse { status: "shipped" }))
}
