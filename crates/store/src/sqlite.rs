use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use common::{CheckoutId, OrderId};
use domain::{Checkout, CheckoutStatus, Order, Product};
use sqlx::{
    Row, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
};

use crate::{
    IdempotencyRecord, RequestLogEntry, Result, StockedProduct,
    store::{Catalog, InventoryLedger, TransactionStore},
};

/// SQLite-backed merchant store.
///
/// Checkout sessions and orders are kept as JSON documents; inventory is a
/// plain counter table so reservations can be done with a single
/// conditional update.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Creates a store on top of an existing pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if necessary) the database at `url` and applies the
    /// migrations.
    ///
    /// `sqlite::memory:` databases live only as long as their connection, so
    /// the pool is pinned to a single long-lived connection in that case.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.run_migrations().await?;
        tracing::info!(url, "sqlite store ready");
        Ok(store)
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Inserts or replaces products and their stock levels.
    pub async fn seed(&self, products: &[StockedProduct]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for stocked in products {
            let product = &stocked.product;
            sqlx::query(
                r#"
                INSERT INTO products (id, title, price, image_url)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    price = excluded.price,
                    image_url = excluded.image_url
                "#,
            )
            .bind(&product.id)
            .bind(&product.title)
            .bind(product.price)
            .bind(&product.image_url)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO inventory (product_id, quantity)
                VALUES (?, ?)
                ON CONFLICT(product_id) DO UPDATE SET quantity = excluded.quantity
                "#,
            )
            .bind(&product.id)
            .bind(i64::from(stocked.quantity))
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Seeds the catalog only if it is empty, so restarts keep stock levels.
    pub async fn seed_if_empty(&self, products: &[StockedProduct]) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        if count > 0 {
            return Ok(false);
        }
        self.seed(products).await?;
        Ok(true)
    }

    /// Returns the request audit log, oldest first.
    pub async fn request_log(&self) -> Result<Vec<RequestLogEntry>> {
        let rows = sqlx::query(
            "SELECT timestamp, method, url, checkout_id, payload FROM request_logs ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_log_entry).collect()
    }

    async fn upsert_checkout<'e, E>(executor: E, checkout: &Checkout) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let data = serde_json::to_string(checkout)?;
        sqlx::query(
            r#"
            INSERT INTO checkouts (id, status, data, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(checkout.id.as_str())
        .bind(checkout.status.as_str())
        .bind(data)
        .bind(Utc::now().to_rfc3339())
        .execute(executor)
        .await?;
        Ok(())
    }

    async fn upsert_order<'e, E>(executor: E, order: &Order) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let data = serde_json::to_string(order)?;
        sqlx::query(
            r#"
            INSERT INTO orders (id, checkout_id, data, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                checkout_id = excluded.checkout_id,
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(order.id.as_str())
        .bind(order.checkout_id.as_str())
        .bind(data)
        .bind(Utc::now().to_rfc3339())
        .execute(executor)
        .await?;
        Ok(())
    }

    fn row_to_product(row: SqliteRow) -> Result<Product> {
        Ok(Product {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            price: row.try_get("price")?,
            image_url: row.try_get("image_url")?,
        })
    }

    fn row_to_log_entry(row: SqliteRow) -> Result<RequestLogEntry> {
        let timestamp: String = row.try_get("timestamp")?;
        let payload: Option<String> = row.try_get("payload")?;
        Ok(RequestLogEntry {
            timestamp: chrono::DateTime::parse_from_rfc3339(&timestamp)
                .map(|ts| ts.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            method: row.try_get("method")?,
            url: row.try_get("url")?,
            checkout_id: row.try_get("checkout_id")?,
            payload: payload.map(|p| serde_json::from_str(&p)).transpose()?,
        })
    }
}

#[async_trait]
impl Catalog for SqliteStore {
    async fn get_product(&self, id: &str) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT id, title, price, image_url FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_product).transpose()
    }
}

#[async_trait]
impl InventoryLedger for SqliteStore {
    async fn available(&self, product_id: &str) -> Result<Option<u32>> {
        let quantity: Option<i64> =
            sqlx::query_scalar("SELECT quantity FROM inventory WHERE product_id = ?")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(quantity.map(|q| u32::try_from(q).unwrap_or(0)))
    }

    async fn reserve(&self, product_id: &str, quantity: u32) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE inventory SET quantity = quantity - ? WHERE product_id = ? AND quantity >= ?",
        )
        .bind(i64::from(quantity))
        .bind(product_id)
        .bind(i64::from(quantity))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn release(&self, product_id: &str, quantity: u32) -> Result<()> {
        sqlx::query("UPDATE inventory SET quantity = quantity + ? WHERE product_id = ?")
            .bind(i64::from(quantity))
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for SqliteStore {
    async fn get_checkout(&self, id: &CheckoutId) -> Result<Option<Checkout>> {
        let data: Option<String> = sqlx::query_scalar("SELECT data FROM checkouts WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(data.map(|d| serde_json::from_str(&d)).transpose()?)
    }

    async fn save_checkout(&self, checkout: &Checkout) -> Result<()> {
        Self::upsert_checkout(&self.pool, checkout).await
    }

    async fn replace_checkout(
        &self,
        checkout: &Checkout,
        expected: CheckoutStatus,
    ) -> Result<bool> {
        let data = serde_json::to_string(checkout)?;
        let result = sqlx::query(
            "UPDATE checkouts SET status = ?, data = ?, updated_at = ? WHERE id = ? AND status = ?",
        )
        .bind(checkout.status.as_str())
        .bind(data)
        .bind(Utc::now().to_rfc3339())
        .bind(checkout.id.as_str())
        .bind(expected.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>> {
        let data: Option<String> = sqlx::query_scalar("SELECT data FROM orders WHERE id = ?")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(data.map(|d| serde_json::from_str(&d)).transpose()?)
    }

    async fn save_order(&self, order: &Order) -> Result<()> {
        Self::upsert_order(&self.pool, order).await
    }

    async fn save_placed_order(&self, checkout: &Checkout, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::upsert_order(&mut *tx, order).await?;
        Self::upsert_checkout(&mut *tx, checkout).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_idempotency_record(&self, key: &str) -> Result<Option<IdempotencyRecord>> {
        let row = sqlx::query(
            "SELECT key, request_hash, response_status, response_body FROM idempotency_records WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let status: i64 = row.try_get("response_status")?;
        Ok(Some(IdempotencyRecord {
            key: row.try_get("key")?,
            request_hash: row.try_get("request_hash")?,
            response_status: u16::try_from(status).unwrap_or(500),
            response_body: row.try_get("response_body")?,
        }))
    }

    async fn save_idempotency_record(&self, record: &IdempotencyRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO idempotency_records (key, request_hash, response_status, response_body, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                request_hash = excluded.request_hash,
                response_status = excluded.response_status,
                response_body = excluded.response_body
            "#,
        )
        .bind(&record.key)
        .bind(&record.request_hash)
        .bind(i64::from(record.response_status))
        .bind(&record.response_body)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn log_request(&self, entry: RequestLogEntry) -> Result<()> {
        let payload = entry.payload.as_ref().map(serde_json::to_string).transpose()?;
        sqlx::query(
            r#"
            INSERT INTO request_logs (timestamp, method, url, checkout_id, payload)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.timestamp.to_rfc3339())
        .bind(&entry.method)
        .bind(&entry.url)
        .bind(&entry.checkout_id)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
