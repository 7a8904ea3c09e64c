//! Domain error types.

use thiserror::Error;

/// Errors raised while building or pricing a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A requested line has no product id.
    #[error("Line item {index} missing product ID")]
    MissingProductId { index: usize },

    /// A line references a product the catalog does not know.
    #[error("Product {0} not found")]
    ProductNotFound(String),

    /// A line asks for zero units.
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: String, quantity: u32 },
}
