//! Domain layer for the UCP merchant checkout server.
//!
//! This crate provides the pure, synchronous core:
//! - The wire-level data model (checkout sessions, orders, requests)
//! - Line item construction from the catalog
//! - The pricing and totals engine
//! - The fulfillment resolver

pub mod catalog;
pub mod error;
pub mod model;
pub mod pricing;
pub mod resolver;

pub use catalog::{LineIds, PriceBook, build_line_items};
pub use error::DomainError;
pub use model::*;
pub use pricing::{TEN_PERCENT_OFF_CODE, recalculate, shipping_options};
pub use resolver::{mock_destinations, resolve};
