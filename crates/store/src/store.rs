use async_trait::async_trait;
use common::{CheckoutId, OrderId};
use domain::{Checkout, CheckoutStatus, Order, Product};

use crate::{IdempotencyRecord, RequestLogEntry, Result};

/// Read-only product catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Looks up a product by id.
    async fn get_product(&self, id: &str) -> Result<Option<Product>>;
}

/// Per-product stock levels.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Units currently available. `None` if the product has no stock record.
    async fn available(&self, product_id: &str) -> Result<Option<u32>>;

    /// Atomically takes `quantity` units if at least that many are available.
    ///
    /// Returns false and leaves the ledger untouched otherwise.
    async fn reserve(&self, product_id: &str, quantity: u32) -> Result<bool>;

    /// Returns previously reserved units to the ledger.
    async fn release(&self, product_id: &str, quantity: u32) -> Result<()>;
}

/// Storage for checkout sessions, orders, idempotency records and the
/// request audit log.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn get_checkout(&self, id: &CheckoutId) -> Result<Option<Checkout>>;

    /// Inserts or replaces a checkout session.
    async fn save_checkout(&self, checkout: &Checkout) -> Result<()>;

    /// Replaces a stored checkout only if its status is still `expected`.
    ///
    /// Returns false and leaves the store untouched if the checkout is
    /// missing or has moved to another status.
    async fn replace_checkout(
        &self,
        checkout: &Checkout,
        expected: CheckoutStatus,
    ) -> Result<bool>;

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>>;

    /// Inserts or replaces an order.
    async fn save_order(&self, order: &Order) -> Result<()>;

    /// Stores a new order together with the checkout that produced it.
    ///
    /// Either both writes land or neither does.
    async fn save_placed_order(&self, checkout: &Checkout, order: &Order) -> Result<()>;

    async fn get_idempotency_record(&self, key: &str) -> Result<Option<IdempotencyRecord>>;

    /// Inserts or replaces the record stored under `record.key`.
    async fn save_idempotency_record(&self, record: &IdempotencyRecord) -> Result<()>;

    /// Appends an entry to the request audit log.
    async fn log_request(&self, entry: RequestLogEntry) -> Result<()>;
}

/// Everything the checkout state machine needs from persistence.
pub trait MerchantStore: Catalog + InventoryLedger + TransactionStore {}

impl<T> MerchantStore for T where T: Catalog + InventoryLedger + TransactionStore {}
