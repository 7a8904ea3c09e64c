//! Platform webhook notifications.

use std::sync::Arc;
use std::time::Duration;

use common::CheckoutId;
use domain::Order;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub const ORDER_PLACED: &str = "order_placed";
pub const ORDER_SHIPPED: &str = "order_shipped";

/// Body POSTed to the platform webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub event_type: String,
    pub checkout_id: CheckoutId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

/// Fire-and-forget delivery of webhook events.
///
/// `notify` must return immediately; delivery failures are the notifier's
/// own concern and never reach the caller.
pub trait WebhookNotifier: Send + Sync {
    fn notify(&self, url: &str, event: WebhookEvent);
}

impl<T: WebhookNotifier + ?Sized> WebhookNotifier for Arc<T> {
    fn notify(&self, url: &str, event: WebhookEvent) {
        (**self).notify(url, event);
    }
}

/// Delivers events over HTTP on a detached task.
#[derive(Debug, Clone)]
pub struct HttpWebhookNotifier {
    client: reqwest::Client,
}

impl HttpWebhookNotifier {
    /// Creates a notifier whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// POSTs one event and reports what happened. Never errors.
    pub async fn deliver(&self, url: &str, event: &WebhookEvent) -> DeliveryOutcome {
        let outcome = match self.client.post(url).json(event).send().await {
            Ok(response) if response.status().is_success() => DeliveryOutcome::Delivered,
            Ok(response) => {
                tracing::warn!(
                    %url,
                    status = %response.status(),
                    event_type = %event.event_type,
                    "webhook rejected"
                );
                DeliveryOutcome::Rejected(response.status().as_u16())
            }
            Err(e) => {
                tracing::warn!(
                    %url,
                    error = %e,
                    event_type = %event.event_type,
                    "webhook delivery failed"
                );
                DeliveryOutcome::Failed
            }
        };
        metrics::counter!("webhook_notifications_total", "outcome" => outcome.label())
            .increment(1);
        outcome
    }
}

/// Result of one webhook POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The platform answered with a 2xx status.
    Delivered,
    /// The platform answered with this non-success status.
    Rejected(u16),
    /// No response: connection error or timeout.
    Failed,
}

impl DeliveryOutcome {
    /// Metric label for this outcome.
    pub fn label(self) -> &'static str {
        match self {
            DeliveryOutcome::Delivered => "delivered",
            DeliveryOutcome::Rejected(_) => "rejected",
            DeliveryOutcome::Failed => "failed",
        }
    }
}

impl WebhookNotifier for HttpWebhookNotifier {
    fn notify(&self, url: &str, event: WebhookEvent) {
        let notifier = self.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            notifier.deliver(&url, &event).await;
        });
    }
}

/// Notifier that forwards events to a channel. Used in tests.
#[derive(Debug, Clone)]
pub struct RecordingWebhookNotifier {
    sender: mpsc::UnboundedSender<(String, WebhookEvent)>,
}

impl RecordingWebhookNotifier {
    /// Creates a notifier and the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<(String, WebhookEvent)>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl WebhookNotifier for RecordingWebhookNotifier {
    fn notify(&self, url: &str, event: WebhookEvent) {
        // A dropped receiver just means nobody is listening.
        let _ = self.sender.send((url.to_string(), event));
    }
}
