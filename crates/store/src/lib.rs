//! Persistence collaborators for the merchant server.
//!
//! The checkout state machine talks to storage only through the traits in
//! [`store`]. Two backends are provided: [`InMemoryStore`] for tests and
//! ephemeral runs, and [`SqliteStore`] for a file-backed database.

pub mod error;
pub mod fixtures;
pub mod memory;
pub mod record;
pub mod sqlite;
pub mod store;

pub use error::{Result, StoreError};
pub use fixtures::{StockedProduct, mock_catalog};
pub use memory::InMemoryStore;
pub use record::{IdempotencyRecord, RequestLogEntry};
pub use sqlite::SqliteStore;
pub use store::{Catalog, InventoryLedger, MerchantStore, TransactionStore};
