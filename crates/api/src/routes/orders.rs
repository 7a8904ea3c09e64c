//! Order capability endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use common::OrderId;
use domain::Order;
use store::MerchantStore;

use crate::AppState;
use crate::error::ApiError;

/// GET /orders/{id}
pub async fn get<S: MerchantStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order = state.checkouts.get_order(&OrderId::from(id)).await?;
    Ok(Json(order))
}

/// PUT /orders/{id}
///
/// Replaces the stored order; the path id wins over any id in the body.
pub async fn update<S: MerchantStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<Order>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let Json(order) = payload?;
    let order = state
        .checkouts
        .update_order(&OrderId::from(id), order)
        .await?;
    Ok(Json(order))
}
