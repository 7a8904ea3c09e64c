//! The checkout session aggregate and its parts.

use common::{CheckoutId, OrderId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{CheckoutStatus, Fulfillment, Payment, PaymentHandler};

/// UCP protocol version implemented by this server.
pub const UCP_VERSION: &str = "2026-01-11";

/// Version stamped into the `ucp` block of checkout and order documents.
pub const RESPONSE_UCP_VERSION: &str = "2022-01-01";

/// A capability entry as advertised in a UCP profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Map<String, Value>>,
}

/// The `ucp` envelope carried on checkout and order responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UcpMetadata {
    pub version: String,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl Default for UcpMetadata {
    fn default() -> Self {
        Self {
            version: RESPONSE_UCP_VERSION.to_string(),
            capabilities: Vec::new(),
        }
    }
}

/// Category of a monetary total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalType {
    Subtotal,
    Total,
    Fulfillment,
    Discount,
    Tax,
    Fee,
    ItemsDiscount,
}

/// A single line in a totals breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Total {
    #[serde(rename = "type")]
    pub kind: TotalType,
    pub amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

impl Total {
    /// Creates a total without display text.
    pub fn new(kind: TotalType, amount: i64) -> Self {
        Self {
            kind,
            amount,
            display_text: None,
        }
    }

    /// Creates a total with display text.
    pub fn labeled(kind: TotalType, amount: i64, display_text: impl Into<String>) -> Self {
        Self {
            kind,
            amount,
            display_text: Some(display_text.into()),
        }
    }
}

/// Item details on a line. Title and price always come from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub title: String,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A line of a checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub item: Item,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub totals: Vec<Total>,
}

/// How a discount amount is spread over the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub path: String,
    pub amount: i64,
}

/// A discount that was applied during the last recalculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub title: String,
    pub amount: i64,
    #[serde(default)]
    pub allocations: Vec<Allocation>,
}

/// Discount codes requested by the buyer and the discounts they produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discounts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<Vec<String>>,
    #[serde(default)]
    pub applied: Vec<AppliedDiscount>,
}

/// Buyer consent flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_of_data: Option<bool>,
}

/// Buyer contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent: Option<Consent>,
}

/// Configuration captured from the calling platform's agent profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// A link attached to a checkout (terms, privacy policy, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A checkout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkout {
    #[serde(default)]
    pub ucp: UcpMetadata,
    pub id: CheckoutId,
    pub status: CheckoutStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub line_items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<Buyer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment: Option<Fulfillment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discounts: Option<Discounts>,
    #[serde(default)]
    pub totals: Vec<Total>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub payment: Payment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_permalink_url: Option<String>,
}

impl Checkout {
    /// Creates an empty `incomplete` session with the default payment handler.
    pub fn new(id: CheckoutId) -> Self {
        Self {
            ucp: UcpMetadata::default(),
            id,
            status: CheckoutStatus::Incomplete,
            currency: None,
            line_items: Vec::new(),
            buyer: None,
            fulfillment: None,
            discounts: None,
            totals: Vec::new(),
            links: Vec::new(),
            payment: Payment {
                handlers: vec![PaymentHandler::google_pay()],
                ..Payment::default()
            },
            platform: None,
            order_id: None,
            order_permalink_url: None,
        }
    }

    /// Returns the amount of the first total of the given kind.
    pub fn total_of(&self, kind: TotalType) -> Option<i64> {
        self.totals.iter().find(|t| t.kind == kind).map(|t| t.amount)
    }

    /// Returns the platform webhook URL, if one was captured.
    pub fn webhook_url(&self) -> Option<&str> {
        self.platform.as_ref()?.webhook_url.as_deref()
    }

    /// Returns the line with the given id.
    pub fn line_item(&self, id: &str) -> Option<&LineItem> {
        self.line_items.iter().find(|li| li.id == id)
    }
}
