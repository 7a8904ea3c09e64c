use common::CheckoutId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Checkout, Discounts, FulfillmentGroupRequest, FulfillmentMethodRequest, FulfillmentRequest,
    LineIds, LineItemRequest, PriceBook, Product, build_line_items, recalculate, resolve,
};

fn price_book() -> PriceBook {
    [
        Product::new("product-1", "Stylish Sunglasses", 2500),
        Product::new("product-2", "Comfy T-Shirt", 3500),
        Product::new("product-3", "Classic Watch", 15000),
        Product::new("product-4", "Leather Wallet", 7500),
        Product::new("product-5", "Running Shoes", 12000),
    ]
    .into_iter()
    .collect()
}

fn checkout_with_lines(prices: &PriceBook, lines: usize) -> Checkout {
    let requested: Vec<LineItemRequest> = (0..lines)
        .map(|i| LineItemRequest::new(format!("product-{}", i % 5 + 1), (i % 3 + 1) as u32))
        .collect();
    let mut checkout = Checkout::new(CheckoutId::new());
    checkout.line_items = build_line_items(&requested, prices, LineIds::Sequential).unwrap();
    checkout
}

fn bench_recalculate_lines_only(c: &mut Criterion) {
    let prices = price_book();
    let checkout = checkout_with_lines(&prices, 5);

    c.bench_function("pricing/recalculate_5_lines", |b| {
        b.iter(|| {
            let mut checkout = checkout.clone();
            recalculate(&mut checkout, &prices).unwrap();
        });
    });
}

fn bench_recalculate_full(c: &mut Criterion) {
    let prices = price_book();
    let mut checkout = checkout_with_lines(&prices, 50);
    let request = FulfillmentRequest {
        methods: Some(vec![FulfillmentMethodRequest {
            selected_destination_id: Some("dest_1".to_string()),
            groups: Some(vec![FulfillmentGroupRequest {
                id: None,
                selected_option_id: Some("exp-ship-us".to_string()),
            }]),
            ..Default::default()
        }]),
    };
    checkout.fulfillment = resolve(Some(&request), &checkout.line_items, None);
    checkout.discounts = Some(Discounts {
        codes: Some(vec!["10OFF".to_string(), "10off".to_string()]),
        applied: Vec::new(),
    });

    c.bench_function("pricing/recalculate_50_lines_shipping_discounts", |b| {
        b.iter(|| {
            let mut checkout = checkout.clone();
            recalculate(&mut checkout, &prices).unwrap();
        });
    });
}

criterion_group!(benches, bench_recalculate_lines_only, bench_recalculate_full);
criterion_main!(benches);
