//! Shared identifier types used across the merchant server crates.

pub mod types;

pub use types::{CheckoutId, OrderId, line_item_id, prefixed_id};
