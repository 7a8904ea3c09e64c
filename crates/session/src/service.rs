//! The checkout session state machine.

use common::{CheckoutId, OrderId};
use domain::{
    Checkout, CheckoutCreateRequest, CheckoutStatus, CheckoutUpdateRequest,
    CompleteCheckoutRequest, FulfillmentEvent, LineIds, LineItemRequest, Order, PriceBook,
    build_line_items, recalculate, resolve,
};
use serde::Serialize;
use store::{IdempotencyRecord, MerchantStore, RequestLogEntry};

use crate::error::{CheckoutError, PaymentError, Result};
use crate::idempotency::{find_prior, request_hash};
use crate::services::{
    AgentProfileResolver, ORDER_PLACED, ORDER_SHIPPED, PaymentGateway, WebhookEvent,
    WebhookNotifier,
};

/// Currency assigned to new sessions that do not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Default prefix of order permalinks.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080";

/// Per-request inputs that travel in headers rather than the body.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Value of the `Idempotency-Key` header.
    pub idempotency_key: Option<String>,
    /// Value of the `UCP-Agent` header.
    pub ucp_agent: Option<String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn with_ucp_agent(mut self, header: impl Into<String>) -> Self {
        self.ucp_agent = Some(header.into());
        self
    }
}

/// A successful operation result with the HTTP status it should be
/// reported with.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub status: u16,
    pub body: T,
    /// True when the body was replayed from an idempotency record.
    pub replayed: bool,
}

impl<T> Reply<T> {
    fn fresh(status: u16, body: T) -> Self {
        Self {
            status,
            body,
            replayed: false,
        }
    }
}

/// Drives checkout sessions through their lifecycle and produces orders.
///
/// ```text
/// create ──► incomplete ──(update)*──► complete ──► completed
///                 │
///                 └──────(cancel)─────────────────► canceled
/// ```
pub struct CheckoutService<S, P, W>
where
    S: MerchantStore,
    P: PaymentGateway,
    W: WebhookNotifier,
{
    store: S,
    payments: P,
    webhooks: W,
    profiles: AgentProfileResolver,
    public_base_url: String,
}

impl<S, P, W> CheckoutService<S, P, W>
where
    S: MerchantStore,
    P: PaymentGateway,
    W: WebhookNotifier,
{
    /// Creates a new checkout service.
    pub fn new(store: S, payments: P, webhooks: W, profiles: AgentProfileResolver) -> Self {
        Self {
            store,
            payments,
            webhooks,
            profiles,
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
        }
    }

    /// Sets the prefix used to build order permalinks.
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Gets a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a new checkout session.
    #[tracing::instrument(skip(self, request, ctx))]
    pub async fn create(
        &self,
        request: CheckoutCreateRequest,
        ctx: &RequestContext,
    ) -> Result<Reply<Checkout>> {
        let idempotency = self.idempotency(ctx, &request).await?;
        if let Some(replay) = idempotency.replay()? {
            return Ok(replay);
        }

        let id = CheckoutId::new();
        self.log(
            RequestLogEntry::new("POST", "/checkout-sessions").with_checkout_id(id.as_str()),
            &request,
        )
        .await;

        let prices = self.price_book(&request.line_items).await?;
        let line_items = build_line_items(&request.line_items, &prices, LineIds::Sequential)?;
        let fulfillment = resolve(request.fulfillment.as_ref(), &line_items, None);
        let platform = self.profiles.resolve(ctx.ucp_agent.as_deref()).await;

        let mut checkout = Checkout::new(id);
        checkout.currency = Some(
            request
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        );
        checkout.line_items = line_items;
        checkout.buyer = request.buyer;
        checkout.fulfillment = fulfillment;
        checkout.discounts = request.discounts;
        checkout.platform = platform;
        checkout.payment.merge(request.payment);

        recalculate(&mut checkout, &prices)?;
        self.validate_inventory(&checkout).await?;

        self.store.save_checkout(&checkout).await?;
        idempotency.remember(&self.store, 201, &checkout).await;

        metrics::counter!("checkout_sessions_created_total").increment(1);
        tracing::info!(
            checkout_id = %checkout.id,
            status = %checkout.status,
            "checkout session created"
        );
        Ok(Reply::fresh(201, checkout))
    }

    /// Returns a stored checkout session.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: &CheckoutId) -> Result<Checkout> {
        self.log_empty(
            RequestLogEntry::new("GET", format!("/checkout-sessions/{id}"))
                .with_checkout_id(id.as_str()),
        )
        .await;
        self.load_checkout(id).await
    }

    /// Replaces the mutable parts of a session and reprices it.
    #[tracing::instrument(skip(self, request, ctx))]
    pub async fn update(
        &self,
        id: &CheckoutId,
        request: CheckoutUpdateRequest,
        ctx: &RequestContext,
    ) -> Result<Reply<Checkout>> {
        let idempotency = self.idempotency(ctx, &request).await?;
        if let Some(replay) = idempotency.replay()? {
            return Ok(replay);
        }

        self.log(
            RequestLogEntry::new("PUT", format!("/checkout-sessions/{id}"))
                .with_checkout_id(id.as_str()),
            &request,
        )
        .await;

        let mut checkout = self.load_checkout(id).await?;
        let loaded_status = checkout.status;
        ensure_not_completing(loaded_status)?;
        if !loaded_status.is_mutable() {
            return Err(CheckoutError::Conflict(format!(
                "Cannot update a {loaded_status} checkout session"
            )));
        }

        if let Some(buyer) = request.buyer {
            checkout.buyer = Some(buyer);
        }
        if let Some(platform) = self.profiles.resolve(ctx.ucp_agent.as_deref()).await {
            checkout.platform = Some(platform);
        }
        checkout.currency = request.currency;
        checkout.payment.merge(request.payment);
        if let Some(discounts) = request.discounts {
            checkout.discounts = Some(discounts);
        }

        let prices = self.price_book(&request.line_items).await?;
        checkout.line_items =
            build_line_items(&request.line_items, &prices, LineIds::PreserveSupplied)?;
        if let Some(requested) = &request.fulfillment {
            checkout.fulfillment = resolve(
                Some(requested),
                &checkout.line_items,
                checkout.fulfillment.as_ref(),
            );
        }

        recalculate(&mut checkout, &prices)?;
        self.validate_inventory(&checkout).await?;

        self.replace_checkout(&checkout, loaded_status).await?;
        idempotency.remember(&self.store, 200, &checkout).await;

        tracing::info!(checkout_id = %checkout.id, "checkout session updated");
        Ok(Reply::fresh(200, checkout))
    }

    /// Authorizes payment, reserves stock and places the order.
    ///
    /// The session is first claimed by moving it to `complete_in_progress`
    /// with a conditional write; concurrent attempts on the same session
    /// lose the claim and get a conflict. Any failure before the order is
    /// stored puts the session back the way it was.
    #[tracing::instrument(skip(self, request, ctx))]
    pub async fn complete(
        &self,
        id: &CheckoutId,
        request: CompleteCheckoutRequest,
        ctx: &RequestContext,
    ) -> Result<Reply<Checkout>> {
        let idempotency = self.idempotency(ctx, &request).await?;
        if let Some(replay) = idempotency.replay()? {
            return Ok(replay);
        }

        self.log(
            RequestLogEntry::new("POST", format!("/checkout-sessions/{id}/complete"))
                .with_checkout_id(id.as_str()),
            &request,
        )
        .await;

        let original = self.load_checkout(id).await?;
        ensure_not_completing(original.status)?;
        if !original.status.is_mutable() {
            return Err(CheckoutError::Conflict(
                "Checkout already completed or canceled".to_string(),
            ));
        }

        let instrument = request
            .payment_data
            .ok_or(PaymentError::MissingPaymentData)?;

        let mut checkout = original.clone();
        checkout.status = CheckoutStatus::CompleteInProgress;
        self.replace_checkout(&checkout, original.status).await?;

        let authorization = match self.payments.authorize(&instrument).await {
            Ok(authorization) => authorization,
            Err(e) => {
                metrics::counter!("checkout_payment_declined_total").increment(1);
                tracing::info!(checkout_id = %id, reason = %e, "payment refused");
                self.abandon_completion(&original).await;
                return Err(e.into());
            }
        };
        tracing::info!(
            checkout_id = %id,
            authorization_id = %authorization.authorization_id,
            handler_id = %authorization.handler_id,
            "payment authorized"
        );

        let reserved = match self.reserve_inventory(&checkout).await {
            Ok(reserved) => reserved,
            Err(e) => {
                self.abandon_completion(&original).await;
                return Err(e);
            }
        };

        let order = match self.place_order(&mut checkout).await {
            Ok(order) => order,
            Err(e) => {
                tracing::error!(checkout_id = %id, error = %e, "failed to place order");
                self.release(&reserved).await;
                self.abandon_completion(&original).await;
                return Err(e);
            }
        };

        self.notify(&checkout, ORDER_PLACED, Some(order));
        idempotency.remember(&self.store, 200, &checkout).await;

        metrics::counter!("checkout_sessions_completed_total").increment(1);
        tracing::info!(
            checkout_id = %checkout.id,
            order_id = ?checkout.order_id,
            "checkout completed"
        );
        Ok(Reply::fresh(200, checkout))
    }

    /// Cancels a session that has not reached a terminal state.
    #[tracing::instrument(skip(self, ctx))]
    pub async fn cancel(&self, id: &CheckoutId, ctx: &RequestContext) -> Result<Reply<Checkout>> {
        let body = serde_json::json!({});
        let idempotency = self.idempotency(ctx, &body).await?;
        if let Some(replay) = idempotency.replay()? {
            return Ok(replay);
        }

        self.log(
            RequestLogEntry::new("POST", format!("/checkout-sessions/{id}/cancel"))
                .with_checkout_id(id.as_str()),
            &body,
        )
        .await;

        let mut checkout = self.load_checkout(id).await?;
        let loaded_status = checkout.status;
        ensure_not_completing(loaded_status)?;
        if !loaded_status.is_mutable() {
            return Err(CheckoutError::Conflict(format!(
                "Cannot cancel a {loaded_status} checkout session"
            )));
        }

        checkout.status = CheckoutStatus::Canceled;
        self.replace_checkout(&checkout, loaded_status).await?;
        idempotency.remember(&self.store, 200, &checkout).await;

        metrics::counter!("checkout_sessions_canceled_total").increment(1);
        tracing::info!(checkout_id = %checkout.id, "checkout canceled");
        Ok(Reply::fresh(200, checkout))
    }

    /// Returns a stored order.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, id: &OrderId) -> Result<Order> {
        self.log_empty(RequestLogEntry::new("GET", format!("/orders/{id}")))
            .await;
        self.load_order(id).await
    }

    /// Replaces a stored order wholesale, keeping its id.
    #[tracing::instrument(skip(self, order))]
    pub async fn update_order(&self, id: &OrderId, mut order: Order) -> Result<Order> {
        self.log(
            RequestLogEntry::new("PUT", format!("/orders/{id}"))
                .with_checkout_id(order.checkout_id.as_str()),
            &order,
        )
        .await;

        self.load_order(id).await?;
        order.id = id.clone();
        self.store.save_order(&order).await?;
        Ok(order)
    }

    /// Records a `shipped` event on an order and tells the platform.
    #[tracing::instrument(skip(self))]
    pub async fn ship_order(&self, id: &OrderId) -> Result<Order> {
        let mut order = self.load_order(id).await?;
        order.record_event(FulfillmentEvent::shipped());
        self.store.save_order(&order).await?;

        if let Some(checkout) = self.store.get_checkout(&order.checkout_id).await? {
            self.notify(&checkout, ORDER_SHIPPED, Some(order.clone()));
        }
        tracing::info!(order_id = %order.id, "order shipped");
        Ok(order)
    }

    async fn load_checkout(&self, id: &CheckoutId) -> Result<Checkout> {
        self.store
            .get_checkout(id)
            .await?
            .ok_or_else(|| CheckoutError::CheckoutNotFound(id.clone()))
    }

    /// Writes `checkout` back only if nobody changed its status since it
    /// was loaded as `expected`.
    async fn replace_checkout(
        &self,
        checkout: &Checkout,
        expected: CheckoutStatus,
    ) -> Result<()> {
        if self.store.replace_checkout(checkout, expected).await? {
            return Ok(());
        }
        metrics::counter!("checkout_write_conflicts_total").increment(1);
        tracing::info!(checkout_id = %checkout.id, %expected, "lost checkout write race");
        Err(CheckoutError::Conflict(
            "Checkout session was modified concurrently".to_string(),
        ))
    }

    /// Returns a claimed session to its state before `complete` began.
    async fn abandon_completion(&self, original: &Checkout) {
        match self
            .store
            .replace_checkout(original, CheckoutStatus::CompleteInProgress)
            .await
        {
            Ok(true) => {}
            Ok(false) => tracing::warn!(
                checkout_id = %original.id,
                "claimed checkout changed before release"
            ),
            Err(e) => tracing::error!(
                checkout_id = %original.id,
                error = %e,
                "failed to release checkout claim"
            ),
        }
    }

    async fn load_order(&self, id: &OrderId) -> Result<Order> {
        self.store
            .get_order(id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(id.clone()))
    }

    /// Fetches the products named by the requested lines. Unknown ids are
    /// left out; line building reports them.
    async fn price_book(&self, lines: &[LineItemRequest]) -> Result<PriceBook> {
        let mut prices = PriceBook::new();
        for line in lines {
            let product_id = line.item.id.as_str();
            if product_id.is_empty() || prices.get(product_id).is_some() {
                continue;
            }
            if let Some(product) = self.store.get_product(product_id).await? {
                prices.insert(product);
            }
        }
        Ok(prices)
    }

    async fn validate_inventory(&self, checkout: &Checkout) -> Result<()> {
        for line in &checkout.line_items {
            let available = self.store.available(&line.item.id).await?;
            if available.is_none_or(|on_hand| on_hand < line.quantity) {
                return Err(CheckoutError::InsufficientStock(line.item.id.clone()));
            }
        }
        Ok(())
    }

    /// Reserves every line in order. On the first refusal, everything
    /// reserved so far is released and `OutOfStock` is returned.
    async fn reserve_inventory(&self, checkout: &Checkout) -> Result<Vec<(String, u32)>> {
        let mut reserved: Vec<(String, u32)> = Vec::new();
        for line in &checkout.line_items {
            let product_id = &line.item.id;
            if self.store.get_product(product_id).await?.is_none() {
                continue;
            }

            let granted = match self.store.reserve(product_id, line.quantity).await {
                Ok(granted) => granted,
                Err(e) => {
                    self.release(&reserved).await;
                    return Err(e.into());
                }
            };
            if !granted {
                self.release(&reserved).await;
                metrics::counter!("checkout_out_of_stock_total").increment(1);
                tracing::info!(checkout_id = %checkout.id, %product_id, "reservation refused");
                return Err(CheckoutError::OutOfStock(product_id.clone()));
            }
            reserved.push((product_id.clone(), line.quantity));
        }
        Ok(reserved)
    }

    async fn release(&self, reserved: &[(String, u32)]) {
        for (product_id, quantity) in reserved {
            if let Err(e) = self.store.release(product_id, *quantity).await {
                tracing::error!(%product_id, quantity, error = %e, "failed to release reservation");
            }
        }
    }

    async fn place_order(&self, checkout: &mut Checkout) -> Result<Order> {
        checkout.status = CheckoutStatus::Completed;

        let order_id = OrderId::new();
        let permalink = format!("{}/orders/{}", self.public_base_url, order_id);
        let order = Order::from_checkout(checkout, order_id, permalink);

        checkout.order_id = Some(order.id.clone());
        checkout.order_permalink_url = Some(order.permalink_url.clone());
        self.store.save_placed_order(checkout, &order).await?;
        Ok(order)
    }

    fn notify(&self, checkout: &Checkout, event_type: &str, order: Option<Order>) {
        let Some(url) = checkout.webhook_url() else {
            return;
        };
        self.webhooks.notify(
            url,
            WebhookEvent {
                event_type: event_type.to_string(),
                checkout_id: checkout.id.clone(),
                order,
            },
        );
    }

    async fn idempotency<T: Serialize>(
        &self,
        ctx: &RequestContext,
        request: &T,
    ) -> Result<Idempotency> {
        let Some(key) = ctx.idempotency_key.clone() else {
            return Ok(Idempotency::None);
        };
        let hash = request_hash(request)?;
        let prior = find_prior(&self.store, &key, &hash).await?;
        Ok(Idempotency::Keyed { key, hash, prior })
    }

    /// Audit logging never fails the request.
    async fn log<T: Serialize>(&self, entry: RequestLogEntry, payload: &T) {
        let entry = match serde_json::to_value(payload) {
            Ok(payload) => entry.with_payload(payload),
            Err(_) => entry,
        };
        self.log_empty(entry).await;
    }

    async fn log_empty(&self, entry: RequestLogEntry) {
        if let Err(e) = self.store.log_request(entry).await {
            tracing::warn!(error = %e, "failed to record request log");
        }
    }
}

/// Rejects any write while a completion holds the session.
fn ensure_not_completing(status: CheckoutStatus) -> Result<()> {
    if status == CheckoutStatus::CompleteInProgress {
        return Err(CheckoutError::Conflict(
            "Checkout session is being completed".to_string(),
        ));
    }
    Ok(())
}

/// Idempotency state of one request.
enum Idempotency {
    None,
    Keyed {
        key: String,
        hash: String,
        prior: Option<IdempotencyRecord>,
    },
}

impl Idempotency {
    /// The stored response, if this request is a retry.
    fn replay(&self) -> Result<Option<Reply<Checkout>>> {
        let Idempotency::Keyed {
            prior: Some(record),
            ..
        } = self
        else {
            return Ok(None);
        };
        metrics::counter!("idempotent_replays_total").increment(1);
        tracing::info!(key = %record.key, "replaying idempotent response");
        Ok(Some(Reply {
            status: record.response_status,
            body: serde_json::from_str(&record.response_body)?,
            replayed: true,
        }))
    }

    /// Stores the response of a successful first attempt.
    ///
    /// Runs after the operation has committed, so a failure here is logged
    /// and the caller still gets its response.
    async fn remember<S: MerchantStore>(self, store: &S, status: u16, checkout: &Checkout) {
        let Idempotency::Keyed { key, hash, .. } = self else {
            return;
        };
        let response_body = match serde_json::to_string(checkout) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(%key, error = %e, "failed to encode idempotent response");
                return;
            }
        };
        let record = IdempotencyRecord {
            key,
            request_hash: hash,
            response_status: status,
            response_body,
        };
        if let Err(e) = store.save_idempotency_record(&record).await {
            metrics::counter!("idempotency_record_failures_total").increment(1);
            tracing::warn!(key = %record.key, error = %e, "failed to store idempotency record");
        }
    }
}
