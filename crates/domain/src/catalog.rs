//! Authoritative product snapshot used to build and price line items.

use std::collections::HashMap;

use common::line_item_id;

use crate::error::DomainError;
use crate::model::{Item, LineItem, LineItemRequest, Product};

/// Products resolved from the catalog for one operation, keyed by id.
///
/// The session state machine fills this from the catalog collaborator
/// before handing it to the pure pricing code.
#[derive(Debug, Clone, Default)]
pub struct PriceBook {
    products: HashMap<String, Product>,
}

impl PriceBook {
    /// Creates an empty price book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(product.id.clone(), product);
    }

    /// Looks up a product by id.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }
}

impl FromIterator<Product> for PriceBook {
    fn from_iter<T: IntoIterator<Item = Product>>(iter: T) -> Self {
        let mut book = PriceBook::new();
        for product in iter {
            book.insert(product);
        }
        book
    }
}

/// How line ids are assigned when building lines from a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineIds {
    /// Always `line_<n>` by position (create).
    Sequential,
    /// Keep a supplied id, otherwise `line_<n>` by position (update).
    PreserveSupplied,
}

/// Builds response lines from requested lines, taking title, price and
/// image from the price book.
pub fn build_line_items(
    requested: &[LineItemRequest],
    prices: &PriceBook,
    ids: LineIds,
) -> Result<Vec<LineItem>, DomainError> {
    requested
        .iter()
        .enumerate()
        .map(|(index, req)| {
            let product_id = req.item.id.as_str();
            if product_id.is_empty() {
                return Err(DomainError::MissingProductId { index });
            }
            let product = prices
                .get(product_id)
                .ok_or_else(|| DomainError::ProductNotFound(product_id.to_string()))?;
            if req.quantity == 0 {
                return Err(DomainError::InvalidQuantity {
                    product_id: product_id.to_string(),
                    quantity: req.quantity,
                });
            }

            let id = match (ids, req.id.as_deref()) {
                (LineIds::PreserveSupplied, Some(id)) if !id.is_empty() => id.to_string(),
                _ => line_item_id(index + 1),
            };

            Ok(LineItem {
                id,
                item: Item {
                    id: product.id.clone(),
                    title: product.title.clone(),
                    price: product.price,
                    image_url: product.image_url.clone(),
                },
                quantity: req.quantity,
                parent_id: req.parent_id.clone(),
                totals: Vec::new(),
            })
        })
        .collect()
}
