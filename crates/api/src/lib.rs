//! HTTP API server with observability for the UCP merchant checkout server.
//!
//! Exposes UCP discovery, the checkout capability, the order capability and
//! a shipping simulation endpoint, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use session::{
    AgentProfileResolver, CheckoutService, HttpWebhookNotifier, MockPaymentGateway,
    WebhookNotifier,
};
use store::MerchantStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// The checkout service as wired into the HTTP layer.
pub type Checkouts<S> = CheckoutService<S, MockPaymentGateway, Arc<dyn WebhookNotifier>>;

/// Shared application state accessible from all handlers.
pub struct AppState<S: MerchantStore> {
    pub checkouts: Checkouts<S>,
    pub simulation_secret: String,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: MerchantStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/.well-known/ucp", get(routes::discovery::profile))
        .route("/checkout-sessions", post(routes::checkouts::create::<S>))
        .route(
            "/checkout-sessions/{id}",
            get(routes::checkouts::get::<S>).put(routes::checkouts::update::<S>),
        )
        .route(
            "/checkout-sessions/{id}/complete",
            post(routes::checkouts::complete::<S>),
        )
        .route(
            "/checkout-sessions/{id}/cancel",
            post(routes::checkouts::cancel::<S>),
        )
        .route(
            "/orders/{id}",
            get(routes::orders::get::<S>).put(routes::orders::update::<S>),
        )
        .route(
            "/testing/simulate-shipping/{id}",
            post(routes::testing::simulate_shipping::<S>),
        )
        .fallback(routes::not_found)
        .with_state(state)
        .merge(metrics_router)
        .layer(middleware::from_fn(routes::version::negotiate))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state over the given store.
///
/// Webhooks are delivered over HTTP and agent profiles are resolved with the
/// configured timeout.
pub fn create_default_state<S: MerchantStore + 'static>(
    store: S,
    config: &Config,
) -> Result<Arc<AppState<S>>, reqwest::Error> {
    let webhooks: Arc<dyn WebhookNotifier> =
        Arc::new(HttpWebhookNotifier::new(config.webhook_timeout)?);
    let profiles = AgentProfileResolver::new(config.webhook_timeout)?;
    Ok(create_state(store, webhooks, profiles, config))
}

/// Creates the application state with an explicit webhook notifier.
pub fn create_state<S: MerchantStore + 'static>(
    store: S,
    webhooks: Arc<dyn WebhookNotifier>,
    profiles: AgentProfileResolver,
    config: &Config,
) -> Arc<AppState<S>> {
    let checkouts = CheckoutService::new(store, MockPaymentGateway::new(), webhooks, profiles)
        .with_public_base_url(config.public_base_url.clone());

    Arc::new(AppState {
        checkouts,
        simulation_secret: config.simulation_secret.clone(),
    })
}
