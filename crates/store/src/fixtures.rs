//! Mock catalog the server starts with.

use domain::Product;

/// A catalog product together with its opening stock level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockedProduct {
    pub product: Product,
    pub quantity: u32,
}

impl StockedProduct {
    pub fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }
}

const IMAGE_BASE_URL: &str = "https://storage.googleapis.com/gemini-flights-cask";

fn stocked(id: &str, title: &str, price: i64, image: &str, quantity: u32) -> StockedProduct {
    StockedProduct::new(
        Product::new(id, title, price).with_image(format!("{IMAGE_BASE_URL}/{image}.jpeg")),
        quantity,
    )
}

/// The five mock products with their inventory.
pub fn mock_catalog() -> Vec<StockedProduct> {
    vec![
        stocked("product-1", "Stylish Sunglasses", 2500, "sunglasses", 10),
        stocked("product-2", "Comfy T-Shirt", 3500, "t-shirt", 15),
        stocked("product-3", "Classic Watch", 15000, "watch", 5),
        stocked("product-4", "Leather Wallet", 7500, "wallet", 20),
        stocked("product-5", "Running Shoes", 12000, "shoes", 12),
    ]
}
