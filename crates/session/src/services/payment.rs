//! Payment gateway trait and the mock authorization policy.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use common::prefixed_id;
use domain::PaymentInstrument;

use crate::error::PaymentError;

/// Handler id whose tokens select a scripted outcome.
pub const MOCK_HANDLER_ID: &str = "mock_payment_handler";

/// Handlers that authorize any tokenized credential.
const ALWAYS_APPROVED_HANDLERS: [&str; 3] = ["google_pay", "gpay", "shop_pay"];

/// Result of a successful authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// The authorization ID assigned by the gateway.
    pub authorization_id: String,
    /// Handler that authorized the payment.
    pub handler_id: String,
}

/// Trait for payment authorization.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Authorizes the instrument for the checkout's total.
    async fn authorize(
        &self,
        instrument: &PaymentInstrument,
    ) -> Result<Authorization, PaymentError>;
}

/// Gateway implementing the fixed mock policy:
///
/// - card instruments carrying a card credential are approved,
/// - `mock_payment_handler` tokens: `success_token` approves, `fail_token`
///   is declined for insufficient funds, `fraud_token` is flagged as fraud,
/// - `google_pay`, `gpay` and `shop_pay` always approve,
/// - any other handler is unsupported.
#[derive(Debug, Clone, Default)]
pub struct MockPaymentGateway {
    approved: Arc<AtomicUsize>,
}

impl MockPaymentGateway {
    /// Creates a new mock gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of approved authorizations so far.
    pub fn approved_count(&self) -> usize {
        self.approved.load(Ordering::SeqCst)
    }

    fn approve(&self, handler_id: &str) -> Authorization {
        self.approved.fetch_add(1, Ordering::SeqCst);
        Authorization {
            authorization_id: prefixed_id("auth"),
            handler_id: handler_id.to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn authorize(
        &self,
        instrument: &PaymentInstrument,
    ) -> Result<Authorization, PaymentError> {
        let credential = instrument
            .credential
            .as_ref()
            .ok_or(PaymentError::MissingCredential)?;
        let handler_id = instrument.handler_id.as_str();

        if instrument.kind == "card" && credential.is_card() {
            return Ok(self.approve(handler_id));
        }

        if handler_id == MOCK_HANDLER_ID {
            return match credential.token.as_deref() {
                Some("success_token") => Ok(self.approve(handler_id)),
                Some("fail_token") => Err(PaymentError::InsufficientFunds),
                Some("fraud_token") => Err(PaymentError::FraudDetected),
                other => Err(PaymentError::UnknownToken(
                    other.unwrap_or("none").to_string(),
                )),
            };
        }

        if ALWAYS_APPROVED_HANDLERS.contains(&handler_id) {
            return Ok(self.approve(handler_id));
        }

        Err(PaymentError::UnsupportedHandler(handler_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::PaymentCredential;
    use serde_json::Map;

    fn instrument(
        handler_id: &str,
        kind: &str,
        credential: Option<(&str, Option<&str>)>,
    ) -> PaymentInstrument {
        PaymentInstrument {
            id: "instr_1".to_string(),
            handler_id: handler_id.to_string(),
            kind: kind.to_string(),
            credential: credential.map(|(kind, token)| PaymentCredential {
                kind: kind.to_string(),
                token: token.map(str::to_string),
                details: Map::new(),
            }),
            billing_address: None,
            brand: None,
            last_digits: None,
            expiry_month: None,
            expiry_year: None,
        }
    }

    #[tokio::test]
    async fn test_card_credentials_are_approved() {
        let gateway = MockPaymentGateway::new();
        let result = gateway
            .authorize(&instrument("anything", "card", Some(("card", None))))
            .await
            .unwrap();
        assert_eq!(result.handler_id, "anything");
        assert!(result.authorization_id.starts_with("auth_"));
        assert_eq!(gateway.approved_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_handler_tokens() {
        let gateway = MockPaymentGateway::new();
        let token =
            |t: &'static str| instrument(MOCK_HANDLER_ID, "card", Some(("token", Some(t))));

        assert!(gateway.authorize(&token("success_token")).await.is_ok());
        assert_eq!(
            gateway.authorize(&token("fail_token")).await.unwrap_err(),
            PaymentError::InsufficientFunds
        );
        assert_eq!(
            gateway.authorize(&token("fraud_token")).await.unwrap_err(),
            PaymentError::FraudDetected
        );
        assert_eq!(
            gateway.authorize(&token("weird")).await.unwrap_err(),
            PaymentError::UnknownToken("weird".to_string())
        );
        assert_eq!(gateway.approved_count(), 1);
    }

    #[tokio::test]
    async fn test_wallet_handlers_always_approve() {
        let gateway = MockPaymentGateway::new();
        for handler in ["google_pay", "gpay", "shop_pay"] {
            let result = gateway
                .authorize(&instrument(handler, "wallet", Some(("token", None))))
                .await;
            assert!(result.is_ok(), "{handler} should approve");
        }
    }

    #[tokio::test]
    async fn test_unknown_handler_and_missing_credential() {
        let gateway = MockPaymentGateway::new();
        assert_eq!(
            gateway
                .authorize(&instrument("paypal", "wallet", Some(("token", Some("t")))))
                .await
                .unwrap_err(),
            PaymentError::UnsupportedHandler("paypal".to_string())
        );
        assert_eq!(
            gateway
                .authorize(&instrument(MOCK_HANDLER_ID, "card", None))
                .await
                .unwrap_err(),
            PaymentError::MissingCredential
        );
    }
}
