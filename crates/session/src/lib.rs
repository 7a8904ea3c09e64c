//! Checkout session state machine for the UCP merchant server.
//!
//! [`CheckoutService`] owns the lifecycle of a checkout session:
//! 1. Create and update, repricing on every change
//! 2. Complete: authorize payment, reserve stock, place the order
//! 3. Cancel
//!
//! Completion first claims the session with a conditional status write, so
//! concurrent completes of one session place at most one order. Stock
//! reservation is sequential; if any line cannot be reserved, the lines
//! already reserved by the same request are released.
//! Every mutating operation honors an optional idempotency key.

pub mod error;
pub mod idempotency;
pub mod service;
pub mod services;

pub use error::{CheckoutError, PaymentError, ProfileError, Result};
pub use service::{
    CheckoutService, DEFAULT_CURRENCY, DEFAULT_PUBLIC_BASE_URL, Reply, RequestContext,
};
pub use services::{
    AgentProfileResolver, Authorization, DeliveryOutcome, HttpWebhookNotifier, MockPaymentGateway,
    PaymentGateway, RecordingWebhookNotifier, WebhookEvent, WebhookNotifier, agent_version,
};
