//! Fulfillment resolver.
//!
//! Turns requested fulfillment methods into the server-side fulfillment
//! tree. Destinations come from the request, from the previous state of the
//! session, or from a fixed pair of mock addresses. Options are left empty;
//! the pricing engine derives them.

use common::prefixed_id;

use crate::model::{
    Destination, Fulfillment, FulfillmentGroup, FulfillmentMethod, FulfillmentMethodRequest,
    FulfillmentRequest, LineItem, NamedLocation, PostalAddress,
};

/// The two mock destinations offered when none are known.
pub fn mock_destinations() -> Vec<Destination> {
    vec![
        Destination::NamedLocation(NamedLocation {
            id: "dest_1".to_string(),
            name: Some("Home (US)".to_string()),
            address_country: Some("US".to_string()),
            address: PostalAddress {
                street_address: Some("1600 Amphitheatre Pkwy".to_string()),
                address_locality: Some("Mountain View".to_string()),
                address_region: Some("CA".to_string()),
                postal_code: Some("94043".to_string()),
                address_country: Some("US".to_string()),
                full_name: Some("John Doe".to_string()),
                ..Default::default()
            },
        }),
        Destination::NamedLocation(NamedLocation {
            id: "dest_2".to_string(),
            name: Some("Office (DE)".to_string()),
            address_country: Some("DE".to_string()),
            address: PostalAddress {
                street_address: Some("ABC Str. 1".to_string()),
                address_locality: Some("Berlin".to_string()),
                postal_code: Some("10115".to_string()),
                address_country: Some("DE".to_string()),
                full_name: Some("Max Mustermann".to_string()),
                ..Default::default()
            },
        }),
    ]
}

/// Resolves requested fulfillment against the current lines.
///
/// Returns `None` when the request carries no fulfillment section.
/// `existing` is the session's previous fulfillment, used to inherit
/// destinations for methods that omit them.
pub fn resolve(
    requested: Option<&FulfillmentRequest>,
    line_items: &[LineItem],
    existing: Option<&Fulfillment>,
) -> Option<Fulfillment> {
    let requested = requested?;
    let line_item_ids: Vec<String> = line_items.iter().map(|li| li.id.clone()).collect();

    let methods = requested
        .methods
        .iter()
        .flatten()
        .map(|method| resolve_method(method, &line_item_ids, existing))
        .collect();

    Some(Fulfillment { methods })
}

fn resolve_method(
    method: &FulfillmentMethodRequest,
    line_item_ids: &[String],
    existing: Option<&Fulfillment>,
) -> FulfillmentMethod {
    let kind = method.method_type();

    let destinations = match &method.destinations {
        Some(supplied) => supplied
            .iter()
            .cloned()
            .map(|mut d| {
                d.ensure_id(|| prefixed_id("dest"));
                d
            })
            .collect(),
        None => existing
            .and_then(|f| f.methods.iter().find(|m| m.kind == kind))
            .map(|m| m.destinations.clone())
            .unwrap_or_else(mock_destinations),
    };

    let groups = match &method.groups {
        Some(requested) if !requested.is_empty() => requested
            .iter()
            .map(|g| FulfillmentGroup {
                id: g.id.clone().unwrap_or_else(|| prefixed_id("group")),
                line_item_ids: line_item_ids.to_vec(),
                selected_option_id: g.selected_option_id.clone(),
                options: Vec::new(),
            })
            .collect(),
        _ => vec![FulfillmentGroup {
            id: prefixed_id("group"),
            line_item_ids: line_item_ids.to_vec(),
            selected_option_id: None,
            options: Vec::new(),
        }],
    };

    FulfillmentMethod {
        id: prefixed_id("method"),
        kind,
        line_item_ids: line_item_ids.to_vec(),
        destinations,
        selected_destination_id: method.selected_destination_id.clone(),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FlatAddress, FulfillmentGroupRequest, Item, MethodType};

    fn lines() -> Vec<LineItem> {
        ["line_1", "line_2"]
            .iter()
            .map(|id| LineItem {
                id: id.to_string(),
                item: Item {
                    id: "product-1".to_string(),
                    title: "Stylish Sunglasses".to_string(),
                    price: 2500,
                    image_url: None,
                },
                quantity: 1,
                parent_id: None,
                totals: vec![],
            })
            .collect()
    }

    fn request(methods: Vec<FulfillmentMethodRequest>) -> FulfillmentRequest {
        FulfillmentRequest {
            methods: Some(methods),
        }
    }

    fn flat(id: &str, country: &str) -> Destination {
        Destination::FlatAddress(FlatAddress {
            id: id.to_string(),
            name: None,
            address: PostalAddress {
                address_country: Some(country.to_string()),
                ..Default::default()
            },
        })
    }

    #[test]
    fn no_request_means_no_fulfillment() {
        assert!(resolve(None, &lines(), None).is_none());
    }

    #[test]
    fn falls_back_to_mock_destinations() {
        let req = request(vec![FulfillmentMethodRequest::default()]);
        let resolved = resolve(Some(&req), &lines(), None).unwrap();

        let method = &resolved.methods[0];
        assert_eq!(method.kind, MethodType::Shipping);
        assert!(method.id.starts_with("method_"));
        let ids: Vec<&str> = method.destinations.iter().map(Destination::id).collect();
        assert_eq!(ids, vec!["dest_1", "dest_2"]);
        assert_eq!(method.destinations[1].country(), Some("DE"));
        assert_eq!(method.line_item_ids, vec!["line_1", "line_2"]);
    }

    #[test]
    fn supplied_destinations_get_ids() {
        let req = request(vec![FulfillmentMethodRequest {
            destinations: Some(vec![flat("", "FR"), flat("mine", "US")]),
            ..Default::default()
        }]);
        let resolved = resolve(Some(&req), &lines(), None).unwrap();
        let destinations = &resolved.methods[0].destinations;
        assert!(destinations[0].id().starts_with("dest_"));
        assert_eq!(destinations[1].id(), "mine");
    }

    #[test]
    fn inherits_destinations_of_same_type() {
        let first = request(vec![FulfillmentMethodRequest {
            destinations: Some(vec![flat("home", "FR")]),
            ..Default::default()
        }]);
        let previous = resolve(Some(&first), &lines(), None).unwrap();

        let second = request(vec![FulfillmentMethodRequest {
            selected_destination_id: Some("home".to_string()),
            ..Default::default()
        }]);
        let resolved = resolve(Some(&second), &lines(), Some(&previous)).unwrap();
        let method = &resolved.methods[0];
        assert_eq!(method.destinations, vec![flat("home", "FR")]);
        assert_eq!(method.selected_destination().map(Destination::id), Some("home"));
    }

    #[test]
    fn does_not_inherit_across_types() {
        let first = request(vec![FulfillmentMethodRequest {
            kind: Some(MethodType::Pickup),
            destinations: Some(vec![flat("store", "US")]),
            ..Default::default()
        }]);
        let previous = resolve(Some(&first), &lines(), None).unwrap();

        let second = request(vec![FulfillmentMethodRequest::default()]);
        let resolved = resolve(Some(&second), &lines(), Some(&previous)).unwrap();
        assert_eq!(resolved.methods[0].destinations, mock_destinations());
    }

    #[test]
    fn groups_preserve_selection_and_span_all_lines() {
        let req = request(vec![FulfillmentMethodRequest {
            groups: Some(vec![FulfillmentGroupRequest {
                id: None,
                selected_option_id: Some("std-ship".to_string()),
            }]),
            ..Default::default()
        }]);
        let resolved = resolve(Some(&req), &lines(), None).unwrap();
        let group = &resolved.methods[0].groups[0];
        assert_eq!(group.selected_option_id.as_deref(), Some("std-ship"));
        assert_eq!(group.line_item_ids, vec!["line_1", "line_2"]);
        assert!(group.options.is_empty());
    }

    #[test]
    fn single_group_seeded_when_none_requested() {
        let req = request(vec![FulfillmentMethodRequest::default()]);
        let resolved = resolve(Some(&req), &lines(), None).unwrap();
        let groups = &resolved.methods[0].groups;
        assert_eq!(groups.len(), 1);
        assert!(groups[0].selected_option_id.is_none());
        assert!(groups[0].options.is_empty());
    }

    #[test]
    fn empty_method_list_resolves_to_empty_fulfillment() {
        let req = FulfillmentRequest { methods: None };
        let resolved = resolve(Some(&req), &lines(), None).unwrap();
        assert!(resolved.methods.is_empty());
    }
}
