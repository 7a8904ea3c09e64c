//! External collaborators of the checkout state machine.

pub mod agent_profile;
pub mod payment;
pub mod webhook;

pub use agent_profile::{AgentProfileResolver, agent_version};
pub use payment::{Authorization, MOCK_HANDLER_ID, MockPaymentGateway, PaymentGateway};
pub use webhook::{
    DeliveryOutcome, HttpWebhookNotifier, ORDER_PLACED, ORDER_SHIPPED, RecordingWebhookNotifier, WebhookEvent,
    WebhookNotifier,
};
