//! Checkout session error types.

use common::{CheckoutId, OrderId};
use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Reasons a payment instrument is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("Missing payment data")]
    MissingPaymentData,

    #[error("Missing credentials in instrument")]
    MissingCredential,

    #[error("Payment Failed: Insufficient Funds (Mock)")]
    InsufficientFunds,

    #[error("Payment Failed: Fraud Detected (Mock)")]
    FraudDetected,

    #[error("Unknown mock token: {0}")]
    UnknownToken(String),

    #[error("Unsupported payment handler: {0}")]
    UnsupportedHandler(String),
}

impl PaymentError {
    /// HTTP status reported for this refusal.
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::InsufficientFunds => 402,
            PaymentError::FraudDetected => 403,
            _ => 400,
        }
    }
}

/// Reasons an agent profile could not be loaded.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Invalid base64 in profile data URI: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Profile is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Profile fetch failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors that can occur during checkout session operations.
///
/// The `Display` text of every variant is safe to return to callers, except
/// for the internal ones (see [`CheckoutError::is_internal`]).
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Checkout session not found")]
    CheckoutNotFound(CheckoutId),

    #[error("Order not found")]
    OrderNotFound(OrderId),

    /// A line references a missing or unknown product.
    #[error("{0}")]
    InvalidLineItem(#[from] DomainError),

    #[error("Insufficient stock for item {0}")]
    InsufficientStock(String),

    /// The session is in a state that does not allow the operation.
    #[error("{0}")]
    Conflict(String),

    #[error("Idempotency key reused with different parameters")]
    IdempotencyConflict,

    #[error("{0}")]
    Payment(#[from] PaymentError),

    /// A reservation failed while completing; earlier reservations were
    /// released.
    #[error("Item {0} is out of stock")]
    OutOfStock(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CheckoutError {
    /// HTTP status reported for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::CheckoutNotFound(_) | CheckoutError::OrderNotFound(_) => 404,
            CheckoutError::InvalidLineItem(_) | CheckoutError::InsufficientStock(_) => 400,
            CheckoutError::Conflict(_)
            | CheckoutError::IdempotencyConflict
            | CheckoutError::OutOfStock(_) => 409,
            CheckoutError::Payment(e) => e.status_code(),
            CheckoutError::Store(_) | CheckoutError::Serialization(_) => 500,
        }
    }

    /// True for failures whose details must not reach the caller.
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_codes() {
        assert_eq!(PaymentError::InsufficientFunds.status_code(), 402);
        assert_eq!(PaymentError::FraudDetected.status_code(), 403);
        assert_eq!(PaymentError::UnknownToken("x".into()).status_code(), 400);
        assert_eq!(PaymentError::MissingCredential.status_code(), 400);
    }

    #[test]
    fn test_checkout_error_mapping() {
        let not_found = CheckoutError::CheckoutNotFound(CheckoutId::from("c1"));
        assert_eq!(not_found.status_code(), 404);
        assert_eq!(not_found.to_string(), "Checkout session not found");

        let invalid = CheckoutError::from(DomainError::ProductNotFound("p".into()));
        assert_eq!(invalid.status_code(), 400);
        assert_eq!(invalid.to_string(), "Product p not found");

        let declined = CheckoutError::from(PaymentError::InsufficientFunds);
        assert_eq!(declined.status_code(), 402);
        assert_eq!(declined.to_string(), "Payment Failed: Insufficient Funds (Mock)");

        assert_eq!(CheckoutError::OutOfStock("product-1".into()).status_code(), 409);
        assert!(!CheckoutError::IdempotencyConflict.is_internal());
    }
}
