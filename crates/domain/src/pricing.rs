//! Pricing and totals engine.
//!
//! Recomputes every monetary figure of a checkout from the catalog and the
//! buyer's own selections. The output depends only on those inputs, so
//! running it twice on an unchanged checkout yields identical totals.

use common::prefixed_id;

use crate::catalog::PriceBook;
use crate::error::DomainError;
use crate::model::{
    AppliedDiscount, Allocation, Checkout, FulfillmentGroup, FulfillmentMethod, FulfillmentOption,
    MethodType, Total, TotalType,
};

/// The one discount code this merchant honors (matched case-insensitively).
pub const TEN_PERCENT_OFF_CODE: &str = "10OFF";

const TEN_PERCENT_OFF_TITLE: &str = "10% Off";

fn option(id: &str, title: &str, description: &str, amount: i64) -> FulfillmentOption {
    FulfillmentOption {
        id: id.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        carrier: None,
        subtotal: amount,
        tax: 0,
        total: amount,
    }
}

/// Mock shipping-rate table keyed on destination country.
pub fn shipping_options(country: &str) -> Vec<FulfillmentOption> {
    if country == "US" {
        vec![
            option("std-ship", "Standard Shipping", "Arrives in 5-7 days", 500),
            option("exp-ship-us", "Express Shipping (US)", "Arrives in 2 days", 1500),
        ]
    } else {
        vec![option(
            "exp-ship-intl",
            "International Express",
            "Arrives in 5-10 days",
            3000,
        )]
    }
}

/// Recomputes line totals, fulfillment options, discounts and checkout totals.
///
/// Fails with [`DomainError::ProductNotFound`] if any line references a
/// product missing from `prices`; the checkout is then partially updated and
/// must not be persisted.
#[tracing::instrument(skip_all, fields(checkout_id = %checkout.id))]
pub fn recalculate(checkout: &mut Checkout, prices: &PriceBook) -> Result<(), DomainError> {
    let mut grand_total = 0i64;

    for line in &mut checkout.line_items {
        let product = prices
            .get(&line.item.id)
            .ok_or_else(|| DomainError::ProductNotFound(line.item.id.clone()))?;
        line.item.price = product.price;
        line.item.title = product.title.clone();

        let line_total = product.price * i64::from(line.quantity);
        line.totals = vec![
            Total::new(TotalType::Subtotal, line_total),
            Total::new(TotalType::Total, line_total),
        ];
        grand_total += line_total;
    }

    checkout.totals = vec![Total::new(TotalType::Subtotal, grand_total)];

    if let Some(fulfillment) = checkout.fulfillment.as_mut() {
        for method in &mut fulfillment.methods {
            for selected in price_shipping(method) {
                grand_total += selected.total;
                checkout.totals.push(Total::labeled(
                    TotalType::Fulfillment,
                    selected.total,
                    selected.title,
                ));
            }
        }
    }

    let discounts = checkout.discounts.get_or_insert_with(Default::default);
    discounts.applied.clear();
    for code in discounts.codes.iter().flatten() {
        if !code.eq_ignore_ascii_case(TEN_PERCENT_OFF_CODE) {
            continue;
        }
        let amount = grand_total.div_euclid(10);
        grand_total -= amount;
        discounts.applied.push(AppliedDiscount {
            code: Some(code.clone()),
            title: TEN_PERCENT_OFF_TITLE.to_string(),
            amount,
            allocations: vec![Allocation {
                path: "subtotal".to_string(),
                amount,
            }],
        });
        checkout.totals.push(Total::new(TotalType::Discount, amount));
    }

    checkout.totals.push(Total::new(TotalType::Total, grand_total));
    tracing::debug!(grand_total, "checkout recalculated");
    Ok(())
}

/// Derives options for a shipping method with a selected destination and
/// returns the options selected across its groups.
fn price_shipping(method: &mut FulfillmentMethod) -> Vec<FulfillmentOption> {
    if method.kind != MethodType::Shipping {
        return Vec::new();
    }
    let Some(country) = method
        .selected_destination()
        .and_then(|d| d.country())
        .map(str::to_owned)
    else {
        return Vec::new();
    };

    let options = shipping_options(&country);
    if method.groups.is_empty() {
        method.groups.push(FulfillmentGroup {
            id: prefixed_id("group"),
            line_item_ids: method.line_item_ids.clone(),
            selected_option_id: None,
            options,
        });
    } else {
        for group in &mut method.groups {
            group.options = options.clone();
        }
    }

    method
        .groups
        .iter()
        .filter_map(FulfillmentGroup::selected_option)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use common::CheckoutId;

    use super::*;
    use crate::model::{
        Destination, Discounts, FlatAddress, Fulfillment, Item, LineItem, NamedLocation,
        PostalAddress, Product,
    };

    fn prices() -> PriceBook {
        [
            Product::new("product-1", "Stylish Sunglasses", 2500),
            Product::new("product-2", "Comfy T-Shirt", 3500),
        ]
        .into_iter()
        .collect()
    }

    fn line(id: &str, product_id: &str, quantity: u32) -> LineItem {
        LineItem {
            id: id.to_string(),
            item: Item {
                id: product_id.to_string(),
                title: "stale title".to_string(),
                price: 1,
                image_url: None,
            },
            quantity,
            parent_id: None,
            totals: vec![],
        }
    }

    fn checkout_with(lines: Vec<LineItem>) -> Checkout {
        let mut checkout = Checkout::new(CheckoutId::from("c1"));
        checkout.line_items = lines;
        checkout
    }

    fn shipping_to(country: &str, selected_option: Option<&str>) -> Fulfillment {
        Fulfillment {
            methods: vec![FulfillmentMethod {
                id: "method_1".to_string(),
                kind: MethodType::Shipping,
                line_item_ids: vec!["line_1".to_string()],
                destinations: vec![Destination::FlatAddress(FlatAddress {
                    id: "dest_1".to_string(),
                    name: None,
                    address: PostalAddress {
                        address_country: Some(country.to_string()),
                        ..Default::default()
                    },
                })],
                selected_destination_id: Some("dest_1".to_string()),
                groups: vec![FulfillmentGroup {
                    id: "group_1".to_string(),
                    line_item_ids: vec!["line_1".to_string()],
                    selected_option_id: selected_option.map(str::to_string),
                    options: vec![],
                }],
            }],
        }
    }

    fn assert_total_is_sum(checkout: &Checkout) {
        let last = checkout.totals.last().unwrap();
        assert_eq!(last.kind, TotalType::Total);
        assert_eq!(
            checkout.totals.iter().filter(|t| t.kind == TotalType::Total).count(),
            1
        );
        let expected: i64 = checkout.totals[..checkout.totals.len() - 1]
            .iter()
            .map(|t| match t.kind {
                TotalType::Discount | TotalType::ItemsDiscount => -t.amount,
                _ => t.amount,
            })
            .sum();
        assert_eq!(last.amount, expected);
    }

    #[test]
    fn line_prices_come_from_catalog() {
        let mut checkout = checkout_with(vec![line("line_1", "product-1", 3)]);
        recalculate(&mut checkout, &prices()).unwrap();

        let line = &checkout.line_items[0];
        assert_eq!(line.item.price, 2500);
        assert_eq!(line.item.title, "Stylish Sunglasses");
        assert_eq!(
            line.totals,
            vec![
                Total::new(TotalType::Subtotal, 7500),
                Total::new(TotalType::Total, 7500)
            ]
        );
        assert_eq!(checkout.total_of(TotalType::Subtotal), Some(7500));
        assert_eq!(checkout.totals.last().unwrap().amount, 7500);
        assert_total_is_sum(&checkout);
    }

    #[test]
    fn price_follows_catalog_changes() {
        let mut checkout = checkout_with(vec![line("line_1", "product-1", 1)]);
        recalculate(&mut checkout, &prices()).unwrap();

        let mut repriced = prices();
        repriced.insert(Product::new("product-1", "Stylish Sunglasses", 3000));
        recalculate(&mut checkout, &repriced).unwrap();
        assert_eq!(checkout.line_items[0].item.price, 3000);
        assert_eq!(checkout.total_of(TotalType::Total), Some(3000));
    }

    #[test]
    fn unknown_product_aborts() {
        let mut checkout = checkout_with(vec![line("line_1", "ghost", 1)]);
        let err = recalculate(&mut checkout, &prices()).unwrap_err();
        assert_eq!(err, DomainError::ProductNotFound("ghost".to_string()));
    }

    #[test]
    fn ten_off_discount() {
        let mut checkout = checkout_with(vec![line("line_1", "product-1", 3)]);
        checkout.discounts = Some(Discounts {
            codes: Some(vec!["10off".to_string()]),
            applied: vec![],
        });
        recalculate(&mut checkout, &prices()).unwrap();

        assert_eq!(checkout.total_of(TotalType::Discount), Some(750));
        assert_eq!(checkout.totals.last().unwrap().amount, 6750);
        let applied = &checkout.discounts.as_ref().unwrap().applied;
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].code.as_deref(), Some("10off"));
        assert_eq!(applied[0].title, "10% Off");
        assert_eq!(applied[0].allocations[0].path, "subtotal");
        assert_eq!(applied[0].allocations[0].amount, 750);
        assert_total_is_sum(&checkout);
    }

    #[test]
    fn repeated_codes_compound_on_running_total() {
        let mut checkout = checkout_with(vec![line("line_1", "product-1", 3)]);
        checkout.discounts = Some(Discounts {
            codes: Some(vec!["10OFF".to_string(), "BOGUS".to_string(), "10OFF".to_string()]),
            applied: vec![],
        });
        recalculate(&mut checkout, &prices()).unwrap();

        let discounts: Vec<i64> = checkout
            .totals
            .iter()
            .filter(|t| t.kind == TotalType::Discount)
            .map(|t| t.amount)
            .collect();
        assert_eq!(discounts, vec![750, 675]);
        assert_eq!(checkout.totals.last().unwrap().amount, 6075);
        assert_total_is_sum(&checkout);
    }

    #[test]
    fn discount_floors_fractions() {
        let mut checkout = checkout_with(vec![line("line_1", "product-1", 1)]);
        let mut odd = prices();
        odd.insert(Product::new("product-1", "Odd", 999));
        checkout.discounts = Some(Discounts {
            codes: Some(vec!["10OFF".to_string()]),
            applied: vec![],
        });
        recalculate(&mut checkout, &odd).unwrap();
        assert_eq!(checkout.total_of(TotalType::Discount), Some(99));
        assert_eq!(checkout.totals.last().unwrap().amount, 900);
    }

    #[test]
    fn us_shipping_options_and_selection() {
        let mut checkout = checkout_with(vec![line("line_1", "product-1", 1)]);
        checkout.fulfillment = Some(shipping_to("US", Some("exp-ship-us")));
        recalculate(&mut checkout, &prices()).unwrap();

        let group = &checkout.fulfillment.as_ref().unwrap().methods[0].groups[0];
        let ids: Vec<&str> = group.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["std-ship", "exp-ship-us"]);

        let fulfillment_total = checkout
            .totals
            .iter()
            .find(|t| t.kind == TotalType::Fulfillment)
            .unwrap();
        assert_eq!(fulfillment_total.amount, 1500);
        assert_eq!(
            fulfillment_total.display_text.as_deref(),
            Some("Express Shipping (US)")
        );
        assert_eq!(checkout.totals.last().unwrap().amount, 4000);
        assert_total_is_sum(&checkout);
    }

    #[test]
    fn international_shipping_uses_nested_country() {
        let mut checkout = checkout_with(vec![line("line_1", "product-1", 1)]);
        let mut fulfillment = shipping_to("US", Some("exp-ship-intl"));
        fulfillment.methods[0].destinations = vec![Destination::NamedLocation(NamedLocation {
            id: "dest_1".to_string(),
            name: Some("Office (DE)".to_string()),
            address_country: None,
            address: PostalAddress {
                address_country: Some("DE".to_string()),
                ..Default::default()
            },
        })];
        checkout.fulfillment = Some(fulfillment);
        recalculate(&mut checkout, &prices()).unwrap();

        let group = &checkout.fulfillment.as_ref().unwrap().methods[0].groups[0];
        assert_eq!(group.options.len(), 1);
        assert_eq!(group.options[0].id, "exp-ship-intl");
        assert_eq!(checkout.total_of(TotalType::Fulfillment), Some(3000));
        assert_eq!(checkout.totals.last().unwrap().amount, 5500);
    }

    #[test]
    fn unknown_selected_option_adds_nothing() {
        let mut checkout = checkout_with(vec![line("line_1", "product-1", 1)]);
        checkout.fulfillment = Some(shipping_to("DE", Some("std-ship")));
        recalculate(&mut checkout, &prices()).unwrap();
        assert_eq!(checkout.total_of(TotalType::Fulfillment), None);
        assert_eq!(checkout.totals.last().unwrap().amount, 2500);
    }

    #[test]
    fn group_is_created_when_missing() {
        let mut checkout = checkout_with(vec![line("line_1", "product-1", 1)]);
        let mut fulfillment = shipping_to("US", None);
        fulfillment.methods[0].groups.clear();
        checkout.fulfillment = Some(fulfillment);
        recalculate(&mut checkout, &prices()).unwrap();

        let method = &checkout.fulfillment.as_ref().unwrap().methods[0];
        assert_eq!(method.groups.len(), 1);
        assert!(method.groups[0].id.starts_with("group_"));
        assert_eq!(method.groups[0].line_item_ids, vec!["line_1".to_string()]);
        assert_eq!(method.groups[0].options.len(), 2);
    }

    #[test]
    fn pickup_methods_are_not_priced() {
        let mut checkout = checkout_with(vec![line("line_1", "product-1", 1)]);
        let mut fulfillment = shipping_to("US", Some("std-ship"));
        fulfillment.methods[0].kind = MethodType::Pickup;
        checkout.fulfillment = Some(fulfillment);
        recalculate(&mut checkout, &prices()).unwrap();
        let group = &checkout.fulfillment.as_ref().unwrap().methods[0].groups[0];
        assert!(group.options.is_empty());
        assert_eq!(checkout.total_of(TotalType::Fulfillment), None);
    }

    #[test]
    fn recalculation_is_idempotent() {
        let mut checkout = checkout_with(vec![
            line("line_1", "product-1", 2),
            line("line_2", "product-2", 1),
        ]);
        checkout.fulfillment = Some(shipping_to("US", Some("std-ship")));
        checkout.discounts = Some(Discounts {
            codes: Some(vec!["10OFF".to_string()]),
            applied: vec![],
        });

        recalculate(&mut checkout, &prices()).unwrap();
        let once = serde_json::to_string(&checkout).unwrap();
        recalculate(&mut checkout, &prices()).unwrap();
        let twice = serde_json::to_string(&checkout).unwrap();
        assert_eq!(once, twice);
        assert_total_is_sum(&checkout);
    }

    #[test]
    fn discounts_block_is_always_present_after_recalc() {
        let mut checkout = checkout_with(vec![line("line_1", "product-1", 1)]);
        recalculate(&mut checkout, &prices()).unwrap();
        let discounts = checkout.discounts.unwrap();
        assert!(discounts.applied.is_empty());
        assert!(discounts.codes.is_none());
    }
}
