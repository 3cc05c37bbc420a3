//! Checkout orchestrator
//!
//! Converts a cart into a committed order. The stock re-check, stock
//! decrement, order write and cart clear ride in ONE database transaction:
//! the conditional `WHERE stock >= $qty` guard inside that transaction is
//! what makes re-check + decrement atomic relative to concurrent checkouts
//! on the same product, so stock can never go negative and partial commits
//! cannot happen.
//!
//! Cash checkout is a single sequential routine. E-wallet checkout is split
//! by the hosted-payment redirect: `begin_ewallet` persists the order in
//! `AWAITING_PAYMENT` (no stock reserved yet) and returns a redirect URL;
//! `finalize_ewallet` runs later, zero or more times, from the callback
//! entry point; the in-transaction status guard makes it idempotent.
//!
//! Notification dispatch happens strictly after commit and is best-effort.

pub mod ewallet;
pub mod money;

pub use ewallet::{
    EwalletGateway, EwalletSession, GatewayError, HostedCheckoutGateway, MockGateway,
    verify_callback_signature,
};
pub use money::VoucherPolicy;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;
use thiserror::Error;
use uuid::Uuid;

use crate::db::models::Order;
use crate::db::repository::cart::CART_TABLE;
use crate::db::repository::order::ORDER_TABLE;
use crate::db::repository::product::PRODUCT_TABLE;
use crate::db::repository::{CartRepository, OrderRepository, RepoError};
use crate::notify::NotificationHub;
use shared::{CartLine, CheckoutStatus, PaymentMethod, PricingBreakdown, StoreEvent};

// Markers THROWn inside the commit transaction, parsed back out of the
// database error text.
const ERR_OUT_OF_STOCK: &str = "OUT_OF_STOCK:";
const ERR_ALREADY_FINALIZED: &str = "ALREADY_FINALIZED";
const ERR_ORDER_MISSING: &str = "ORDER_MISSING";

/// Checkout failure classification
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Validation: checkout attempted with no line items
    #[error("Cart is empty")]
    EmptyCart,

    /// Conflict: a line's requested quantity exceeds current stock
    #[error("Insufficient stock for {name}")]
    InsufficientStock { product_id: String, name: String },

    /// Validation: e-wallet total below the configured minimum
    #[error("Order total {total:.2} is below the e-wallet minimum {minimum:.2}")]
    BelowMinimum { total: f64, minimum: f64 },

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// External payment collaborator failure (retryable)
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// Store unreachable or write failed (retryable)
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl From<RepoError> for CheckoutError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => CheckoutError::OrderNotFound(msg),
            other => CheckoutError::Persistence(other.to_string()),
        }
    }
}

impl From<GatewayError> for CheckoutError {
    fn from(e: GatewayError) -> Self {
        CheckoutError::Gateway(e.to_string())
    }
}

impl From<CheckoutError> for crate::utils::AppError {
    fn from(err: CheckoutError) -> Self {
        use crate::utils::AppError;
        match err {
            CheckoutError::EmptyCart => AppError::Validation("Cart is empty".to_string()),
            CheckoutError::InsufficientStock { name, .. } => AppError::Conflict(format!(
                "{name} is unavailable, please adjust quantity"
            )),
            err @ CheckoutError::BelowMinimum { .. } => AppError::BusinessRule(err.to_string()),
            CheckoutError::OrderNotFound(msg) => AppError::NotFound(msg),
            CheckoutError::Gateway(msg) => AppError::Internal(msg),
            CheckoutError::Persistence(msg) => AppError::Database(msg),
        }
    }
}

/// Result of an e-wallet callback invocation
#[derive(Debug)]
pub enum FinalizeOutcome {
    /// First callback: stock reserved, cart cleared, status now PROCESSING
    Finalized(Order),
    /// Repeat callback: no stock decrement, no status change
    AlreadyFinalized(Order),
}

impl FinalizeOutcome {
    pub fn order(&self) -> &Order {
        match self {
            FinalizeOutcome::Finalized(order) | FinalizeOutcome::AlreadyFinalized(order) => order,
        }
    }
}

/// The checkout pipeline
#[derive(Clone)]
pub struct CheckoutService {
    db: Surreal<Db>,
    hub: NotificationHub,
    voucher: VoucherPolicy,
    ewallet_min_total: f64,
    callback_base_url: String,
}

impl CheckoutService {
    pub fn new(
        db: Surreal<Db>,
        hub: NotificationHub,
        voucher: VoucherPolicy,
        ewallet_min_total: f64,
        callback_base_url: impl Into<String>,
    ) -> Self {
        Self {
            db,
            hub,
            voucher,
            ewallet_min_total,
            callback_base_url: callback_base_url.into(),
        }
    }

    /// Pricing preview for the current cart (no side effects)
    pub async fn quote(
        &self,
        shopper_id: &str,
        voucher_code: Option<&str>,
    ) -> Result<PricingBreakdown, CheckoutError> {
        let cart = CartRepository::new(self.db.clone()).get(shopper_id).await?;
        let (rate, applied) = money::resolve_discount_rate(voucher_code, &self.voucher);
        Ok(money::price_cart(&cart.lines, rate, applied))
    }

    /// Cash checkout: snapshot, validate, commit, notify.
    pub async fn checkout_cash(
        &self,
        shopper_id: &str,
        voucher_code: Option<&str>,
    ) -> Result<Order, CheckoutError> {
        let cart = CartRepository::new(self.db.clone()).get(shopper_id).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let (rate, applied) = money::resolve_discount_rate(voucher_code, &self.voucher);
        let pricing = money::price_cart(&cart.lines, rate, applied);

        let order_key = Uuid::new_v4().to_string();
        let mut order = Order::from_snapshot(
            shopper_id,
            PaymentMethod::Cash,
            cart.lines.clone(),
            &pricing,
            CheckoutStatus::Processing,
        );

        self.commit_cash(&order_key, &order, shopper_id).await?;
        order.id = Some(RecordId::from_table_key(ORDER_TABLE, order_key.as_str()));

        tracing::info!(
            order_id = %order_key,
            shopper_id = %shopper_id,
            total = pricing.total,
            "Cash checkout committed"
        );

        self.hub.publish(StoreEvent::OrderPlaced {
            order_id: order_key,
            shopper_id: shopper_id.to_string(),
            payment_method: PaymentMethod::Cash,
            total: pricing.total,
        });

        Ok(order)
    }

    /// Start an e-wallet checkout: persist the order pre-commit and hand the
    /// shopper a hosted redirect. Stock is NOT reserved until the callback.
    pub async fn begin_ewallet(
        &self,
        shopper_id: &str,
        voucher_code: Option<&str>,
        gateway: &dyn EwalletGateway,
    ) -> Result<EwalletSession, CheckoutError> {
        let cart = CartRepository::new(self.db.clone()).get(shopper_id).await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let (rate, applied) = money::resolve_discount_rate(voucher_code, &self.voucher);
        let pricing = money::price_cart(&cart.lines, rate, applied);

        // Enforced before any external call
        if pricing.total < self.ewallet_min_total {
            return Err(CheckoutError::BelowMinimum {
                total: pricing.total,
                minimum: self.ewallet_min_total,
            });
        }

        let order = Order::from_snapshot(
            shopper_id,
            PaymentMethod::Ewallet,
            cart.lines,
            &pricing,
            CheckoutStatus::AwaitingPayment,
        );
        let created = OrderRepository::new(self.db.clone()).create(order).await?;
        let order_id = created.key();

        let return_url = format!(
            "{}/api/checkout/ewallet/callback?order_id={}",
            self.callback_base_url, order_id
        );
        let redirect_url = gateway
            .create_session(&order_id, &created.lines, &pricing, &return_url)
            .await?;

        tracing::info!(order_id = %order_id, shopper_id = %shopper_id, "E-wallet session created");

        Ok(EwalletSession {
            order_id,
            redirect_url,
        })
    }

    /// E-wallet callback entry point. Safe to invoke more than once for the
    /// same order: repeat invocations are a no-op.
    pub async fn finalize_ewallet(&self, order_id: &str) -> Result<FinalizeOutcome, CheckoutError> {
        let orders = OrderRepository::new(self.db.clone());
        let order = orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;

        // Fast path; the real guard runs inside the transaction below
        if order.checkout_status != CheckoutStatus::AwaitingPayment {
            return Ok(FinalizeOutcome::AlreadyFinalized(order));
        }

        match self.commit_finalize(order_id, &order).await {
            Ok(()) => {}
            Err(CheckoutError::Persistence(msg)) if msg.contains(ERR_ALREADY_FINALIZED) => {
                // Lost the race against a concurrent callback; still a no-op
                let current = orders
                    .find_by_id(order_id)
                    .await?
                    .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;
                return Ok(FinalizeOutcome::AlreadyFinalized(current));
            }
            Err(e) => return Err(e),
        }

        tracing::info!(order_id = %order_id, "E-wallet checkout finalized");

        self.hub.publish(StoreEvent::OrderPlaced {
            order_id: order_id.to_string(),
            shopper_id: order.shopper_id.clone(),
            payment_method: PaymentMethod::Ewallet,
            total: order.total,
        });

        let finalized = orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.to_string()))?;
        Ok(FinalizeOutcome::Finalized(finalized))
    }

    // =========================================================================
    // Commit transactions
    // =========================================================================

    /// Conditional per-line stock decrements; each failed guard aborts the
    /// whole transaction via THROW.
    fn push_decrement_statements(sql: &mut String, lines: &[CartLine]) {
        for i in 0..lines.len() {
            sql.push_str(&format!(
                "LET $u{i} = (UPDATE $p{i} SET stock -= $q{i} WHERE stock >= $q{i} RETURN AFTER);\n\
                 IF array::len($u{i}) == 0 {{ THROW $e{i} }};\n"
            ));
        }
    }

    fn bind_lines<'r>(
        mut query: surrealdb::method::Query<'r, Db>,
        lines: &[CartLine],
    ) -> surrealdb::method::Query<'r, Db> {
        for (i, line) in lines.iter().enumerate() {
            let product = RecordId::from_table_key(PRODUCT_TABLE, line.product_id.as_str());
            query = query
                .bind((format!("p{i}"), product))
                .bind((format!("q{i}"), line.quantity))
                .bind((
                    format!("e{i}"),
                    format!("{ERR_OUT_OF_STOCK}{}", line.product_id),
                ));
        }
        query
    }

    /// Cash commit: decrement stock for every line, create the order, clear
    /// the cart, all-or-nothing. Conflicting concurrent transactions are
    /// retried.
    async fn commit_cash(
        &self,
        order_key: &str,
        order: &Order,
        shopper_id: &str,
    ) -> Result<(), CheckoutError> {
        let mut sql = String::from("BEGIN TRANSACTION;\n");
        Self::push_decrement_statements(&mut sql, &order.lines);
        sql.push_str(
            "CREATE $order_id CONTENT $order;\n\
             UPDATE $cart SET lines = [], updated_at = $now;\n\
             COMMIT TRANSACTION;",
        );

        let order_value = order_content(order)?;
        let extra = [
            (
                "order_id",
                ExtraBind::Record(RecordId::from_table_key(ORDER_TABLE, order_key)),
            ),
            ("order", ExtraBind::Json(order_value)),
            (
                "cart",
                ExtraBind::Record(RecordId::from_table_key(CART_TABLE, shopper_id)),
            ),
            ("now", ExtraBind::Text(chrono::Utc::now().to_rfc3339())),
        ];

        self.run_commit(&sql, &order.lines, &extra).await
    }

    /// Callback commit: status guard first, then the same decrement + cart
    /// clear sequence as cash, then the AWAITING_PAYMENT -> PROCESSING step.
    async fn commit_finalize(&self, order_id: &str, order: &Order) -> Result<(), CheckoutError> {
        let mut sql = String::from(
            "BEGIN TRANSACTION;\n\
             LET $ord = (SELECT * FROM ONLY $order_id);\n",
        );
        sql.push_str(&format!(
            "IF $ord IS NONE {{ THROW '{ERR_ORDER_MISSING}' }};\n\
             IF $ord.checkout_status != 'AWAITING_PAYMENT' {{ THROW '{ERR_ALREADY_FINALIZED}' }};\n"
        ));
        Self::push_decrement_statements(&mut sql, &order.lines);
        sql.push_str(
            "UPDATE $order_id SET checkout_status = 'PROCESSING';\n\
             UPDATE $cart SET lines = [], updated_at = $now;\n\
             COMMIT TRANSACTION;",
        );

        let extra = [
            (
                "order_id",
                ExtraBind::Record(RecordId::from_table_key(ORDER_TABLE, order_id)),
            ),
            (
                "cart",
                ExtraBind::Record(RecordId::from_table_key(
                    CART_TABLE,
                    order.shopper_id.as_str(),
                )),
            ),
            ("now", ExtraBind::Text(chrono::Utc::now().to_rfc3339())),
        ];

        let result = self.run_commit(&sql, &order.lines, &extra).await;

        match result {
            Err(CheckoutError::Persistence(msg)) if msg.contains(ERR_ORDER_MISSING) => {
                Err(CheckoutError::OrderNotFound(order_id.to_string()))
            }
            other => other,
        }
    }

    /// Execute a commit transaction, retrying when the storage layer reports
    /// a read/write conflict between concurrent transactions.
    async fn run_commit(
        &self,
        sql: &str,
        lines: &[CartLine],
        extra: &[(&str, ExtraBind)],
    ) -> Result<(), CheckoutError> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut query = self.db.query(sql.to_string());
            for (name, value) in extra {
                query = match value {
                    ExtraBind::Record(id) => query.bind((name.to_string(), id.clone())),
                    ExtraBind::Json(v) => query.bind((name.to_string(), v.clone())),
                    ExtraBind::Text(s) => query.bind((name.to_string(), s.clone())),
                };
            }
            let query = Self::bind_lines(query, lines);

            let mut response = query
                .await
                .map_err(|e| CheckoutError::Persistence(e.to_string()))?;

            // A cancelled transaction reports an error for EVERY statement;
            // only the one that threw carries the marker, so all of them
            // have to be inspected.
            let errors = response.take_errors();
            if errors.is_empty() {
                return Ok(());
            }
            let msg = errors
                .into_values()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");

            if has_abort_marker(&msg) {
                return Err(map_commit_error(msg, lines));
            }
            if is_retryable_conflict(&msg) && attempt < COMMIT_RETRIES {
                tracing::debug!(attempt, "Commit conflict, retrying");
                tokio::time::sleep(std::time::Duration::from_millis(5 * attempt as u64)).await;
                continue;
            }
            return Err(map_commit_error(msg, lines));
        }
    }
}

/// Extra parameters bound into a commit transaction alongside the per-line
/// product/quantity bindings
enum ExtraBind {
    Record(RecordId),
    Json(serde_json::Value),
    Text(String),
}

/// Max attempts for a conflicted commit transaction
const COMMIT_RETRIES: usize = 8;

/// SurrealDB reports optimistic-concurrency losers with a retryable error
fn is_retryable_conflict(msg: &str) -> bool {
    msg.contains("read or write conflict") || msg.contains("can be retried")
}

/// Whether a commit failure was a deliberate in-transaction abort
fn has_abort_marker(msg: &str) -> bool {
    msg.contains(ERR_OUT_OF_STOCK)
        || msg.contains(ERR_ALREADY_FINALIZED)
        || msg.contains(ERR_ORDER_MISSING)
}

/// Serialize the order for `CONTENT`, dropping the id field (the record id
/// comes from the CREATE target).
fn order_content(order: &Order) -> Result<serde_json::Value, CheckoutError> {
    let mut value = serde_json::to_value(order)
        .map_err(|e| CheckoutError::Persistence(format!("order serialization failed: {e}")))?;
    if let Some(map) = value.as_object_mut() {
        map.remove("id");
    }
    Ok(value)
}

/// Map a failed commit back to the typed error taxonomy
fn map_commit_error(msg: String, lines: &[CartLine]) -> CheckoutError {
    if let Some(rest) = msg.split(ERR_OUT_OF_STOCK).nth(1) {
        let product_id: String = rest
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect();
        let name = lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map(|l| l.name.clone())
            .unwrap_or_else(|| product_id.clone());
        return CheckoutError::InsufficientStock { product_id, name };
    }
    CheckoutError::Persistence(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::ProductCreate;
    use crate::db::repository::ProductRepository;
    use shared::ProductCategory;

    async fn setup() -> (Surreal<Db>, CheckoutService, NotificationHub) {
        let service = DbService::open_in_memory().await.unwrap();
        let hub = NotificationHub::new(64);
        let checkout = CheckoutService::new(
            service.db.clone(),
            hub.clone(),
            VoucherPolicy {
                code: "BOTICA10".to_string(),
                rate: 0.10,
            },
            30.0,
            "http://localhost:3000",
        );
        (service.db, checkout, hub)
    }

    async fn seed_product(db: &Surreal<Db>, name: &str, price: f64, stock: i64) -> String {
        let repo = ProductRepository::new(db.clone());
        let product = repo
            .create(ProductCreate {
                name: name.to_string(),
                description: String::new(),
                unit_price: price,
                category: ProductCategory::PainRelief,
                requires_prescription: Some(false),
                stock: Some(stock),
                dosages: None,
                purposes: None,
                expiry_date: None,
            })
            .await
            .unwrap();
        product.key()
    }

    async fn add_to_cart(db: &Surreal<Db>, shopper: &str, product_id: &str, price: f64, qty: i64) {
        CartRepository::new(db.clone())
            .add_item(
                shopper,
                CartLine {
                    product_id: product_id.to_string(),
                    name: format!("Product {product_id}"),
                    unit_price: price,
                    quantity: qty,
                    dosage: None,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cash_checkout_commits_order_and_clears_cart() {
        let (db, checkout, hub) = setup().await;
        let mut events = hub.subscribe();

        let p1 = seed_product(&db, "Paracetamol", 100.0, 10).await;
        add_to_cart(&db, "maria", &p1, 100.0, 2).await;

        let order = checkout.checkout_cash("maria", None).await.unwrap();

        assert_eq!(order.subtotal, 200.0);
        assert_eq!(order.discount, 10.0);
        assert_eq!(order.tax, 22.8);
        assert_eq!(order.total, 212.8);
        assert_eq!(order.checkout_status, CheckoutStatus::Processing);

        // Stock decremented
        let stock = ProductRepository::new(db.clone())
            .get_stock(&p1)
            .await
            .unwrap();
        assert_eq!(stock, 8);

        // Cart empty immediately after
        let cart = CartRepository::new(db.clone()).get("maria").await.unwrap();
        assert!(cart.is_empty());

        // Exactly one order record exists
        let orders = OrderRepository::new(db.clone())
            .list_by_shopper("maria")
            .await
            .unwrap();
        assert_eq!(orders.len(), 1);

        // Post-commit event published
        let event = events.try_recv().unwrap();
        assert!(matches!(event, StoreEvent::OrderPlaced { total, .. } if total == 212.8));
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected_without_side_effects() {
        let (db, checkout, _hub) = setup().await;

        let err = checkout.checkout_cash("maria", None).await.unwrap_err();
        assert!(matches!(err, CheckoutError::EmptyCart));

        let orders = OrderRepository::new(db.clone())
            .list_by_shopper("maria")
            .await
            .unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_stock_aborts_whole_checkout() {
        let (db, checkout, _hub) = setup().await;

        let p1 = seed_product(&db, "Paracetamol", 10.0, 10).await;
        let p2 = seed_product(&db, "Amoxicillin", 20.0, 1).await;
        add_to_cart(&db, "maria", &p1, 10.0, 2).await;
        add_to_cart(&db, "maria", &p2, 20.0, 5).await;

        let err = checkout.checkout_cash("maria", None).await.unwrap_err();
        match err {
            CheckoutError::InsufficientStock { product_id, .. } => assert_eq!(product_id, p2),
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // No partial commit: neither product's stock moved, cart intact
        let products = ProductRepository::new(db.clone());
        assert_eq!(products.get_stock(&p1).await.unwrap(), 10);
        assert_eq!(products.get_stock(&p2).await.unwrap(), 1);

        let cart = CartRepository::new(db.clone()).get("maria").await.unwrap();
        assert_eq!(cart.lines.len(), 2);

        let orders = OrderRepository::new(db.clone())
            .list_by_shopper("maria")
            .await
            .unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_voucher_code_changes_totals() {
        let (db, checkout, _hub) = setup().await;

        let p1 = seed_product(&db, "Paracetamol", 100.0, 10).await;
        add_to_cart(&db, "maria", &p1, 100.0, 2).await;

        let order = checkout
            .checkout_cash("maria", Some("BOTICA10"))
            .await
            .unwrap();
        assert_eq!(order.discount, 20.0);
        assert_eq!(order.total, 201.6);
    }

    #[tokio::test]
    async fn test_ewallet_below_minimum_rejected_before_gateway() {
        let (db, checkout, _hub) = setup().await;

        let p1 = seed_product(&db, "Paracetamol", 10.0, 10).await;
        add_to_cart(&db, "maria", &p1, 10.0, 1).await;

        let gateway = MockGateway::new("http://localhost:3000");
        let err = checkout
            .begin_ewallet("maria", None, &gateway)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckoutError::BelowMinimum { .. }));

        // Nothing persisted
        let orders = OrderRepository::new(db.clone())
            .list_by_shopper("maria")
            .await
            .unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_ewallet_begin_does_not_reserve_stock() {
        let (db, checkout, _hub) = setup().await;

        let p1 = seed_product(&db, "Paracetamol", 100.0, 10).await;
        add_to_cart(&db, "maria", &p1, 100.0, 2).await;

        let gateway = MockGateway::new("http://localhost:3000");
        let session = checkout
            .begin_ewallet("maria", None, &gateway)
            .await
            .unwrap();
        assert!(session.redirect_url.contains(&session.order_id));

        // Pre-commit state: order exists AWAITING_PAYMENT, stock untouched,
        // cart still populated
        let order = OrderRepository::new(db.clone())
            .find_by_id(&session.order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.checkout_status, CheckoutStatus::AwaitingPayment);
        assert_eq!(
            ProductRepository::new(db.clone())
                .get_stock(&p1)
                .await
                .unwrap(),
            10
        );
        assert!(
            !CartRepository::new(db.clone())
                .get("maria")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_ewallet_callback_is_idempotent() {
        let (db, checkout, _hub) = setup().await;

        let p1 = seed_product(&db, "Paracetamol", 100.0, 10).await;
        add_to_cart(&db, "maria", &p1, 100.0, 2).await;

        let gateway = MockGateway::new("http://localhost:3000");
        let session = checkout
            .begin_ewallet("maria", None, &gateway)
            .await
            .unwrap();

        // First callback reserves stock and clears the cart
        let outcome = checkout.finalize_ewallet(&session.order_id).await.unwrap();
        assert!(matches!(outcome, FinalizeOutcome::Finalized(_)));
        assert_eq!(
            outcome.order().checkout_status,
            CheckoutStatus::Processing
        );

        let products = ProductRepository::new(db.clone());
        assert_eq!(products.get_stock(&p1).await.unwrap(), 8);

        // Second callback (redelivery / back-navigation) is a no-op
        let outcome = checkout.finalize_ewallet(&session.order_id).await.unwrap();
        assert!(matches!(outcome, FinalizeOutcome::AlreadyFinalized(_)));
        assert_eq!(products.get_stock(&p1).await.unwrap(), 8);
    }

    #[tokio::test]
    async fn test_ewallet_callback_unknown_order() {
        let (_db, checkout, _hub) = setup().await;
        let err = checkout.finalize_ewallet("missing").await.unwrap_err();
        assert!(matches!(err, CheckoutError::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_quote_empty_cart_is_all_zeros() {
        let (_db, checkout, _hub) = setup().await;
        let pricing = checkout.quote("maria", None).await.unwrap();
        assert_eq!(pricing.subtotal, 0.0);
        assert_eq!(pricing.total, 0.0);
    }
}
