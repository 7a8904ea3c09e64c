//! Orders produced by completed checkout sessions.

use chrono::{DateTime, Utc};
use common::{CheckoutId, OrderId, prefixed_id};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Checkout, Item, MethodType, PostalAddress, Total, UcpMetadata};

/// Ordered versus fulfilled quantity of an order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quantity {
    pub total: u32,
    pub fulfilled: u32,
}

/// Fulfillment progress of an order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderLineItemStatus {
    #[default]
    Processing,
    Partial,
    Fulfilled,
}

impl OrderLineItemStatus {
    /// Derives the status from a quantity pair.
    pub fn from_quantity(quantity: Quantity) -> Self {
        if quantity.total > 0 && quantity.fulfilled >= quantity.total {
            OrderLineItemStatus::Fulfilled
        } else if quantity.fulfilled > 0 {
            OrderLineItemStatus::Partial
        } else {
            OrderLineItemStatus::Processing
        }
    }
}

/// A line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: String,
    pub item: Item,
    pub quantity: Quantity,
    #[serde(default)]
    pub totals: Vec<Total>,
    pub status: OrderLineItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Line reference inside an expectation or fulfillment event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemQuantity {
    pub id: String,
    pub quantity: u32,
}

/// A promised fulfillment commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expectation {
    pub id: String,
    pub destination: PostalAddress,
    pub method_type: MethodType,
    pub line_items: Vec<LineItemQuantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillable_on: Option<String>,
}

/// Something that happened to the shipment (e.g. `shipped`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub occurred_at: DateTime<Utc>,
    #[serde(default)]
    pub line_items: Vec<LineItemQuantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FulfillmentEvent {
    /// A `shipped` event with no line detail, stamped now.
    pub fn shipped() -> Self {
        Self {
            id: prefixed_id("evt"),
            kind: "shipped".to_string(),
            occurred_at: Utc::now(),
            line_items: Vec::new(),
            carrier: None,
            tracking_number: None,
            tracking_url: None,
            description: None,
        }
    }
}

/// Fulfillment section of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFulfillment {
    #[serde(default)]
    pub expectations: Vec<Expectation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<FulfillmentEvent>>,
}

/// An order created from a completed checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub ucp: UcpMetadata,
    pub id: OrderId,
    pub checkout_id: CheckoutId,
    pub permalink_url: String,
    pub line_items: Vec<OrderLineItem>,
    #[serde(default)]
    pub totals: Vec<Total>,
    pub fulfillment: OrderFulfillment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustments: Option<Vec<Value>>,
}

impl Order {
    /// Builds the order for a checkout that has just been paid for.
    ///
    /// Every line starts unfulfilled. One expectation is produced per group
    /// whose selected option resolves, addressed to the method's selected
    /// destination (an empty address when none is selected).
    pub fn from_checkout(checkout: &Checkout, id: OrderId, permalink_url: String) -> Self {
        let line_items = checkout
            .line_items
            .iter()
            .map(|li| {
                let quantity = Quantity {
                    total: li.quantity,
                    fulfilled: 0,
                };
                OrderLineItem {
                    id: li.id.clone(),
                    item: li.item.clone(),
                    quantity,
                    totals: li.totals.clone(),
                    status: OrderLineItemStatus::from_quantity(quantity),
                    parent_id: li.parent_id.clone(),
                }
            })
            .collect();

        Self {
            ucp: checkout.ucp.clone(),
            id,
            checkout_id: checkout.id.clone(),
            permalink_url,
            line_items,
            totals: checkout.totals.clone(),
            fulfillment: OrderFulfillment {
                expectations: expectations_for(checkout),
                events: None,
            },
            adjustments: None,
        }
    }

    /// Appends a fulfillment event.
    pub fn record_event(&mut self, event: FulfillmentEvent) {
        self.fulfillment.events.get_or_insert_with(Vec::new).push(event);
    }
}

fn expectations_for(checkout: &Checkout) -> Vec<Expectation> {
    let Some(fulfillment) = &checkout.fulfillment else {
        return Vec::new();
    };

    let mut expectations = Vec::new();
    for method in &fulfillment.methods {
        let destination = method
            .selected_destination()
            .map(|d| d.postal_address().clone())
            .unwrap_or_default();

        for group in &method.groups {
            let Some(selected) = group.selected_option() else {
                continue;
            };
            let line_items = group
                .line_item_ids
                .iter()
                .filter_map(|id| checkout.line_item(id))
                .map(|li| LineItemQuantity {
                    id: li.id.clone(),
                    quantity: li.quantity,
                })
                .collect();

            expectations.push(Expectation {
                id: prefixed_id("exp"),
                destination: destination.clone(),
                method_type: method.kind,
                line_items,
                description: Some(selected.title.clone()),
                fulfillable_on: None,
            });
        }
    }
    expectations
}
