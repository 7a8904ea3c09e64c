//! Checkout capability endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use common::CheckoutId;
use domain::{Checkout, CheckoutCreateRequest, CheckoutUpdateRequest, CompleteCheckoutRequest};
use session::{Reply, RequestContext};
use store::MerchantStore;

use super::{IDEMPOTENCY_KEY, UCP_AGENT, header_str};
use crate::AppState;
use crate::error::ApiError;

type CheckoutResponse = Result<(StatusCode, Json<Checkout>), ApiError>;

/// Builds the per-request context from the idempotency and agent headers.
pub fn request_context(headers: &HeaderMap) -> RequestContext {
    let mut ctx = RequestContext::new();
    if let Some(key) = header_str(headers, IDEMPOTENCY_KEY) {
        ctx = ctx.with_idempotency_key(key);
    }
    if let Some(agent) = header_str(headers, UCP_AGENT) {
        ctx = ctx.with_ucp_agent(agent);
    }
    ctx
}

fn respond(reply: Reply<Checkout>) -> CheckoutResponse {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::OK);
    Ok((status, Json(reply.body)))
}

/// POST /checkout-sessions
pub async fn create<S: MerchantStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    payload: Result<Json<CheckoutCreateRequest>, JsonRejection>,
) -> CheckoutResponse {
    let Json(request) = payload?;
    let reply = state
        .checkouts
        .create(request, &request_context(&headers))
        .await?;
    respond(reply)
}

/// GET /checkout-sessions/{id}
pub async fn get<S: MerchantStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Checkout>, ApiError> {
    let checkout = state.checkouts.get(&CheckoutId::from(id)).await?;
    Ok(Json(checkout))
}

/// PUT /checkout-sessions/{id}
pub async fn update<S: MerchantStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<CheckoutUpdateRequest>, JsonRejection>,
) -> CheckoutResponse {
    let Json(request) = payload?;
    let reply = state
        .checkouts
        .update(&CheckoutId::from(id), request, &request_context(&headers))
        .await?;
    respond(reply)
}

/// POST /checkout-sessions/{id}/complete
pub async fn complete<S: MerchantStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<CompleteCheckoutRequest>, JsonRejection>,
) -> CheckoutResponse {
    let Json(request) = payload?;
    let reply = state
        .checkouts
        .complete(&CheckoutId::from(id), request, &request_context(&headers))
        .await?;
    respond(reply)
}

/// POST /checkout-sessions/{id}/cancel
///
/// Takes no body.
pub async fn cancel<S: MerchantStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> CheckoutResponse {
    let reply = state
        .checkouts
        .cancel(&CheckoutId::from(id), &request_context(&headers))
        .await?;
    respond(reply)
}
