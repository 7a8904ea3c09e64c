use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CheckoutId, OrderId};
use domain::{Checkout, CheckoutStatus, Order, Product};
use tokio::sync::RwLock;

use crate::{
    IdempotencyRecord, RequestLogEntry, Result, StockedProduct,
    store::{Catalog, InventoryLedger, TransactionStore},
};

#[derive(Debug, Default)]
struct State {
    products: HashMap<String, Product>,
    inventory: HashMap<String, u32>,
    checkouts: HashMap<CheckoutId, Checkout>,
    orders: HashMap<OrderId, Order>,
    idempotency: HashMap<String, IdempotencyRecord>,
    request_log: Vec<RequestLogEntry>,
}

/// In-memory merchant store.
///
/// Cloning yields a handle onto the same shared state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store preloaded with the given products and stock.
    pub async fn with_products(products: &[StockedProduct]) -> Self {
        let store = Self::new();
        store.seed(products).await;
        store
    }

    /// Inserts or replaces products and their stock levels.
    pub async fn seed(&self, products: &[StockedProduct]) {
        let mut state = self.state.write().await;
        for stocked in products {
            let id = stocked.product.id.clone();
            state.inventory.insert(id.clone(), stocked.quantity);
            state.products.insert(id, stocked.product.clone());
        }
    }

    /// Overwrites the stock level of one product.
    pub async fn set_inventory(&self, product_id: &str, quantity: u32) {
        self.state
            .write()
            .await
            .inventory
            .insert(product_id.to_string(), quantity);
    }

    /// Returns a copy of the request audit log.
    pub async fn request_log(&self) -> Vec<RequestLogEntry> {
        self.state.read().await.request_log.clone()
    }

    /// Number of stored checkout sessions.
    pub async fn checkout_count(&self) -> usize {
        self.state.read().await.checkouts.len()
    }

    /// Number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

#[async_trait]
impl Catalog for InMemoryStore {
    async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(id).cloned())
    }
}

#[async_trait]
impl InventoryLedger for InMemoryStore {
    async fn available(&self, product_id: &str) -> Result<Option<u32>> {
        Ok(self.state.read().await.inventory.get(product_id).copied())
    }

    async fn reserve(&self, product_id: &str, quantity: u32) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.inventory.get_mut(product_id) {
            Some(on_hand) if *on_hand >= quantity => {
                *on_hand -= quantity;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release(&self, product_id: &str, quantity: u32) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(on_hand) = state.inventory.get_mut(product_id) {
            *on_hand = on_hand.saturating_add(quantity);
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn get_checkout(&self, id: &CheckoutId) -> Result<Option<Checkout>> {
        Ok(self.state.read().await.checkouts.get(id).cloned())
    }

    async fn save_checkout(&self, checkout: &Checkout) -> Result<()> {
        self.state
            .write()
            .await
            .checkouts
            .insert(checkout.id.clone(), checkout.clone());
        Ok(())
    }

    async fn replace_checkout(
        &self,
        checkout: &Checkout,
        expected: CheckoutStatus,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.checkouts.get_mut(&checkout.id) {
            Some(stored) if stored.status == expected => {
                *stored = checkout.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(id).cloned())
    }

    async fn save_order(&self, order: &Order) -> Result<()> {
        self.state
            .write()
            .await
            .orders
            .insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn save_placed_order(&self, checkout: &Checkout, order: &Order) -> Result<()> {
        let mut state = self.state.write().await;
        state.orders.insert(order.id.clone(), order.clone());
        state.checkouts.insert(checkout.id.clone(), checkout.clone());
        Ok(())
    }

    async fn get_idempotency_record(&self, key: &str) -> Result<Option<IdempotencyRecord>> {
        Ok(self.state.read().await.idempotency.get(key).cloned())
    }

    async fn save_idempotency_record(&self, record: &IdempotencyRecord) -> Result<()> {
        self.state
            .write()
            .await
            .idempotency
            .insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn log_request(&self, entry: RequestLogEntry) -> Result<()> {
        self.state.write().await.request_log.push(entry);
        Ok(())
    }
}
