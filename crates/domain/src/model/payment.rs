//! Payment handlers, instruments and credentials.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::PostalAddress;

/// A payment handler advertised by the merchant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentHandler {
    pub id: String,
    pub name: String,
    pub version: String,
    pub spec: String,
    pub config_schema: String,
    #[serde(default)]
    pub instrument_schemas: Vec<String>,
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl PaymentHandler {
    /// The Google Pay handler attached to every new checkout session.
    pub fn google_pay() -> Self {
        Self {
            id: "google_pay".to_string(),
            name: "google.pay".to_string(),
            version: "2025-03-25".to_string(),
            spec: "https://example.com/spec".to_string(),
            config_schema: "https://example.com/schema".to_string(),
            instrument_schemas: vec!["https://example.com/instrument_schema".to_string()],
            config: Map::new(),
        }
    }
}

/// Credential attached to a payment instrument.
///
/// Only `type` and `token` are interpreted; card details and other
/// handler-specific fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCredential {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl PaymentCredential {
    /// Returns true for raw card credentials.
    pub fn is_card(&self) -> bool {
        self.kind == "card"
    }
}

/// A payment instrument selected by the buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInstrument {
    pub id: String,
    pub handler_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<PaymentCredential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<PostalAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_digits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_month: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_year: Option<u32>,
}

/// Payment section of a checkout session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub handlers: Vec<PaymentHandler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruments: Option<Vec<PaymentInstrument>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_instrument_id: Option<String>,
}

/// Payment section of a create or update request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruments: Option<Vec<PaymentInstrument>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_instrument_id: Option<String>,
}

impl Payment {
    /// Shallow merge: every field present in the request overrides the
    /// stored value, absent fields keep it.
    pub fn merge(&mut self, request: PaymentRequest) {
        if request.instruments.is_some() {
            self.instruments = request.instruments;
        }
        if request.selected_instrument_id.is_some() {
            self.selected_instrument_id = request.selected_instrument_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_keeps_unknown_fields() {
        let json = serde_json::json!({
            "type": "token",
            "token": "success_token",
            "cryptogram": "abc"
        });
        let credential: PaymentCredential = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(credential.token.as_deref(), Some("success_token"));
        assert!(!credential.is_card());
        assert_eq!(serde_json::to_value(&credential).unwrap(), json);
    }

    #[test]
    fn merge_overrides_only_present_fields() {
        let mut payment = Payment {
            handlers: vec![PaymentHandler::google_pay()],
            instruments: None,
            selected_instrument_id: Some("instr_1".to_string()),
        };
        payment.merge(PaymentRequest {
            instruments: Some(vec![]),
            selected_instrument_id: None,
        });
        assert_eq!(payment.instruments, Some(vec![]));
        assert_eq!(payment.selected_instrument_id.as_deref(), Some("instr_1"));
        assert_eq!(payment.handlers.len(), 1);
    }
}
