//! Fulfillment configuration: methods, destinations, groups and options.

use serde::{Deserialize, Serialize};

/// A postal address. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extended_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Retail-location destination shape: `{id, name?, address: {...}}`,
/// optionally also carrying a top-level `address_country`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedLocation {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_country: Option<String>,
    pub address: PostalAddress,
}

/// Destination with postal address fields at the top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatAddress {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub address: PostalAddress,
}

/// A fulfillment destination.
///
/// An empty `id` means "not yet assigned".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Destination {
    NamedLocation(NamedLocation),
    FlatAddress(FlatAddress),
}

impl Destination {
    /// Returns the destination id (empty if unassigned).
    pub fn id(&self) -> &str {
        match self {
            Destination::NamedLocation(loc) => &loc.id,
            Destination::FlatAddress(flat) => &flat.id,
        }
    }

    /// Assigns an id when none was supplied.
    pub fn ensure_id(&mut self, generate: impl FnOnce() -> String) {
        let id = match self {
            Destination::NamedLocation(loc) => &mut loc.id,
            Destination::FlatAddress(flat) => &mut flat.id,
        };
        if id.is_empty() {
            *id = generate();
        }
    }

    /// Country code: the top-level field wins, then the nested address.
    pub fn country(&self) -> Option<&str> {
        match self {
            Destination::NamedLocation(loc) => loc
                .address_country
                .as_deref()
                .or(loc.address.address_country.as_deref()),
            Destination::FlatAddress(flat) => flat.address.address_country.as_deref(),
        }
    }

    /// The postal address goods are delivered to.
    pub fn postal_address(&self) -> &PostalAddress {
        match self {
            Destination::NamedLocation(loc) => &loc.address,
            Destination::FlatAddress(flat) => &flat.address,
        }
    }
}

/// Delivery method kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MethodType {
    #[default]
    Shipping,
    Pickup,
    Digital,
}

/// A server-derived fulfillment option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentOption {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(default)]
    pub subtotal: i64,
    #[serde(default)]
    pub tax: i64,
    pub total: i64,
}

/// A group of line items sharing one option selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentGroup {
    pub id: String,
    pub line_item_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option_id: Option<String>,
    #[serde(default)]
    pub options: Vec<FulfillmentOption>,
}

impl FulfillmentGroup {
    /// The option the buyer selected, if it is among the derived options.
    pub fn selected_option(&self) -> Option<&FulfillmentOption> {
        let selected = self.selected_option_id.as_deref()?;
        self.options.iter().find(|o| o.id == selected)
    }
}

/// A fulfillment method with its destinations and groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentMethod {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MethodType,
    pub line_item_ids: Vec<String>,
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_destination_id: Option<String>,
    #[serde(default)]
    pub groups: Vec<FulfillmentGroup>,
}

impl FulfillmentMethod {
    /// The destination matching `selected_destination_id`.
    pub fn selected_destination(&self) -> Option<&Destination> {
        let selected = self.selected_destination_id.as_deref()?;
        self.destinations.iter().find(|d| d.id() == selected)
    }
}

/// Fulfillment section of a checkout session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fulfillment {
    #[serde(default)]
    pub methods: Vec<FulfillmentMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_location_parses_with_nested_address() {
        let json = serde_json::json!({
            "id": "store_1",
            "name": "Downtown",
            "address": {"address_country": "DE", "postal_code": "10115"}
        });
        let dest: Destination = serde_json::from_value(json).unwrap();
        assert!(matches!(dest, Destination::NamedLocation(_)));
        assert_eq!(dest.country(), Some("DE"));
        assert_eq!(dest.postal_address().postal_code.as_deref(), Some("10115"));
    }

    #[test]
    fn flat_address_parses_without_nested_address() {
        let json = serde_json::json!({
            "street_address": "1 Main St",
            "address_country": "US"
        });
        let dest: Destination = serde_json::from_value(json).unwrap();
        assert!(matches!(dest, Destination::FlatAddress(_)));
        assert_eq!(dest.id(), "");
        assert_eq!(dest.country(), Some("US"));
    }

    #[test]
    fn flat_country_wins_over_nested() {
        let dest = Destination::NamedLocation(NamedLocation {
            id: "d".to_string(),
            name: None,
            address_country: Some("US".to_string()),
            address: PostalAddress {
                address_country: Some("DE".to_string()),
                ..Default::default()
            },
        });
        assert_eq!(dest.country(), Some("US"));
    }

    #[test]
    fn ensure_id_only_fills_missing() {
        let mut dest = Destination::FlatAddress(FlatAddress {
            id: String::new(),
            name: None,
            address: PostalAddress::default(),
        });
        dest.ensure_id(|| "dest_new".to_string());
        assert_eq!(dest.id(), "dest_new");
        dest.ensure_id(|| "dest_other".to_string());
        assert_eq!(dest.id(), "dest_new");
    }

    #[test]
    fn flat_address_serializes_flat() {
        let dest = Destination::FlatAddress(FlatAddress {
            id: "dest_1".to_string(),
            name: None,
            address: PostalAddress {
                address_country: Some("US".to_string()),
                ..Default::default()
            },
        });
        let json = serde_json::to_value(&dest).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "dest_1", "address_country": "US"})
        );
    }
}
