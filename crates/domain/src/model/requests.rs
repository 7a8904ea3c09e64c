//! Inbound request bodies for checkout operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Buyer, Destination, Discounts, MethodType, PaymentInstrument, PaymentRequest};

/// Reference to a catalog item. Anything but the id is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    #[serde(default)]
    pub id: String,
}

/// A requested line. `id` is only honored on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub item: ItemRequest,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl LineItemRequest {
    /// Convenience constructor for a new line.
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: None,
            item: ItemRequest {
                id: product_id.into(),
            },
            quantity,
            parent_id: None,
        }
    }
}

/// A group selection within a requested fulfillment method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentGroupRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option_id: Option<String>,
}

/// A requested fulfillment method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentMethodRequest {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MethodType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destinations: Option<Vec<Destination>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_destination_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<FulfillmentGroupRequest>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_item_ids: Option<Vec<String>>,
}

impl FulfillmentMethodRequest {
    /// Requested method type, defaulting to shipping.
    pub fn method_type(&self) -> MethodType {
        self.kind.unwrap_or_default()
    }
}

/// Requested fulfillment configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<FulfillmentMethodRequest>>,
}

/// Body of `POST /checkout-sessions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutCreateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub line_items: Vec<LineItemRequest>,
    #[serde(default)]
    pub payment: PaymentRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<Buyer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<FulfillmentRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounts: Option<Discounts>,
}

/// Body of `PUT /checkout-sessions/{id}`. Line items are a full replacement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub line_items: Vec<LineItemRequest>,
    #[serde(default)]
    pub payment: PaymentRequest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<Buyer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<FulfillmentRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounts: Option<Discounts>,
}

/// Body of `POST /checkout-sessions/{id}/complete`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompleteCheckoutRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<PaymentInstrument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_signals: Option<Map<String, Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_type_defaults_to_shipping() {
        let method: FulfillmentMethodRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(method.method_type(), MethodType::Shipping);
    }

    #[test]
    fn create_request_minimal_body() {
        let req: CheckoutCreateRequest = serde_json::from_value(serde_json::json!({
            "line_items": [{"item": {"id": "product-1"}, "quantity": 3}]
        }))
        .unwrap();
        assert_eq!(req.line_items, vec![LineItemRequest::new("product-1", 3)]);
        assert!(req.currency.is_none());
        assert!(req.fulfillment.is_none());
    }

    #[test]
    fn complete_request_without_payment_data_parses() {
        let req: CompleteCheckoutRequest = serde_json::from_str("{}").unwrap();
        assert!(req.payment_data.is_none());
    }
}
