//! Notification dispatcher
//!
//! Background task that turns store events into pushes: resolves recipient
//! tokens from the registry, renders the message, and fires it at the
//! gateway. Every failure here is logged and swallowed; delivery problems
//! never reach the shopper-facing flow.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{NotificationHub, PushGateway};
use crate::db::repository::{DeviceTokenRepository, ProductRepository};
use shared::{PushNotification, StoreEvent};

pub struct Dispatcher {
    db: Surreal<Db>,
    gateway: Arc<dyn PushGateway>,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub fn new(db: Surreal<Db>, gateway: Arc<dyn PushGateway>, shutdown: CancellationToken) -> Self {
        Self {
            db,
            gateway,
            shutdown,
        }
    }

    /// Subscribe to the hub and process events until shutdown
    pub fn spawn(self, hub: &NotificationHub) -> JoinHandle<()> {
        let mut rx = hub.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => break,
                    event = rx.recv() => match event {
                        Ok(event) => self.handle_event(event).await,
                        Err(RecvError::Lagged(missed)) => {
                            // At-most-once: dropped events are not replayed
                            tracing::warn!(missed, "Notification dispatcher lagged, events dropped");
                        }
                        Err(RecvError::Closed) => break,
                    },
                }
            }
            tracing::debug!("Notification dispatcher stopped");
        })
    }

    async fn handle_event(&self, event: StoreEvent) {
        match event {
            StoreEvent::OrderPlaced {
                order_id,
                shopper_id,
                total,
                ..
            } => {
                let shopper_push = PushNotification::new(
                    "Order placed",
                    format!("Your order is now being processed (total ₱{total:.2})"),
                )
                .with_data("order_id", order_id.clone());
                self.send_to_shopper(&shopper_id, shopper_push).await;

                let admin_push = PushNotification::new(
                    "New order",
                    format!("{shopper_id} placed an order for ₱{total:.2}"),
                )
                .with_data("order_id", order_id);
                self.send_to_admins(admin_push).await;
            }
            StoreEvent::OrderConfirmed {
                order_id,
                shopper_id,
            } => {
                let push = PushNotification::new("Order confirmed", "Your order has been confirmed")
                    .with_data("order_id", order_id);
                self.send_to_shopper(&shopper_id, push).await;
            }
            StoreEvent::StockLow {
                product_id,
                name,
                stock,
            } => {
                let push = PushNotification::new(
                    "Low stock alert",
                    format!("{name} is down to {stock} units"),
                )
                .with_data("product_id", product_id);
                self.send_to_admins(push).await;
            }
            StoreEvent::ExpiryApproaching {
                product_id,
                name,
                expiry_date,
            } => {
                let push = PushNotification::new(
                    "Expiry approaching",
                    format!("{name} expires on {expiry_date}"),
                )
                .with_data("product_id", product_id);
                self.send_to_admins(push).await;
            }
        }
    }

    async fn send_to_shopper(&self, shopper_id: &str, push: PushNotification) {
        let tokens = DeviceTokenRepository::new(self.db.clone());
        match tokens.find_by_owner(shopper_id).await {
            Ok(Some(token)) => self.deliver(&token.token, &push).await,
            Ok(None) => {
                tracing::debug!(shopper_id, "No device token registered, push skipped");
            }
            Err(e) => tracing::warn!(error = %e, "Token lookup failed, push skipped"),
        }
    }

    async fn send_to_admins(&self, push: PushNotification) {
        let tokens = DeviceTokenRepository::new(self.db.clone());
        match tokens.list_admin_tokens().await {
            Ok(admins) => {
                for admin in admins {
                    self.deliver(&admin.token, &push).await;
                }
            }
            Err(e) => tracing::warn!(error = %e, "Admin token lookup failed, pushes skipped"),
        }
    }

    async fn deliver(&self, token: &str, push: &PushNotification) {
        if let Err(e) = self.gateway.send(token, push).await {
            tracing::warn!(error = %e, title = %push.title, "Push delivery failed");
        }
    }
}

/// Periodic inventory sweep: publishes low-stock and nearing-expiry alerts
/// for admin recipients.
pub fn spawn_stock_sweep(
    db: Surreal<Db>,
    hub: NotificationHub,
    threshold: i64,
    window_days: i64,
    interval_secs: u64,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs.max(1)));
        // The immediate first tick would alert before anyone subscribes
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    run_stock_sweep(&db, &hub, threshold, window_days).await;
                }
            }
        }
        tracing::debug!("Inventory sweep stopped");
    })
}

/// One sweep pass over the inventory alert views
pub async fn run_stock_sweep(
    db: &Surreal<Db>,
    hub: &NotificationHub,
    threshold: i64,
    window_days: i64,
) {
    let products = ProductRepository::new(db.clone());

    match products.list_low_stock(threshold).await {
        Ok(low) => {
            for product in low {
                hub.publish(StoreEvent::StockLow {
                    product_id: product.key(),
                    name: product.name.clone(),
                    stock: product.stock,
                });
            }
        }
        Err(e) => tracing::warn!(error = %e, "Low-stock sweep failed"),
    }

    match products.list_nearing_expiry(window_days).await {
        Ok(nearing) => {
            for product in nearing {
                let expiry = product
                    .expiry_date
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                hub.publish(StoreEvent::ExpiryApproaching {
                    product_id: product.key(),
                    name: product.name.clone(),
                    expiry_date: expiry,
                });
            }
        }
        Err(e) => tracing::warn!(error = %e, "Expiry sweep failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::notify::PushError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every push instead of sending it
    #[derive(Debug, Default)]
    struct RecordingGateway {
        sent: Mutex<Vec<(String, PushNotification)>>,
    }

    #[async_trait]
    impl PushGateway for RecordingGateway {
        async fn send(
            &self,
            token: &str,
            notification: &PushNotification,
        ) -> Result<(), PushError> {
            self.sent
                .lock()
                .unwrap()
                .push((token.to_string(), notification.clone()));
            Ok(())
        }
    }

    /// Gateway that always fails; delivery errors must be swallowed
    #[derive(Debug, Default)]
    struct FailingGateway;

    #[async_trait]
    impl PushGateway for FailingGateway {
        async fn send(&self, _: &str, _: &PushNotification) -> Result<(), PushError> {
            Err(PushError::Request("unreachable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_order_placed_notifies_shopper_and_admins() {
        let service = DbService::open_in_memory().await.unwrap();
        let tokens = DeviceTokenRepository::new(service.db.clone());
        tokens.register("maria", "tok-maria", false).await.unwrap();
        tokens.register("admin-1", "tok-admin", true).await.unwrap();

        let gateway = Arc::new(RecordingGateway::default());
        let dispatcher = Dispatcher::new(
            service.db.clone(),
            gateway.clone(),
            CancellationToken::new(),
        );

        dispatcher
            .handle_event(StoreEvent::OrderPlaced {
                order_id: "o1".to_string(),
                shopper_id: "maria".to_string(),
                payment_method: shared::PaymentMethod::Cash,
                total: 212.8,
            })
            .await;

        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, "tok-maria");
        assert_eq!(sent[1].0, "tok-admin");
        // Admin push carries the order id as metadata
        assert_eq!(
            sent[1].1.data.get("order_id").and_then(|v| v.as_str()),
            Some("o1")
        );
    }

    #[tokio::test]
    async fn test_stock_low_goes_to_admins_only() {
        let service = DbService::open_in_memory().await.unwrap();
        let tokens = DeviceTokenRepository::new(service.db.clone());
        tokens.register("maria", "tok-maria", false).await.unwrap();
        tokens.register("admin-1", "tok-admin", true).await.unwrap();

        let gateway = Arc::new(RecordingGateway::default());
        let dispatcher = Dispatcher::new(
            service.db.clone(),
            gateway.clone(),
            CancellationToken::new(),
        );

        dispatcher
            .handle_event(StoreEvent::StockLow {
                product_id: "p1".to_string(),
                name: "Paracetamol".to_string(),
                stock: 2,
            })
            .await;

        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "tok-admin");
    }

    #[tokio::test]
    async fn test_delivery_failure_is_swallowed() {
        let service = DbService::open_in_memory().await.unwrap();
        let tokens = DeviceTokenRepository::new(service.db.clone());
        tokens.register("maria", "tok-maria", false).await.unwrap();

        let dispatcher = Dispatcher::new(
            service.db.clone(),
            Arc::new(FailingGateway),
            CancellationToken::new(),
        );

        // Must not panic or propagate
        dispatcher
            .handle_event(StoreEvent::OrderConfirmed {
                order_id: "o1".to_string(),
                shopper_id: "maria".to_string(),
            })
            .await;
    }

    #[tokio::test]
    async fn test_sweep_publishes_alert_events() {
        use crate::db::models::ProductCreate;
        use shared::ProductCategory;

        let service = DbService::open_in_memory().await.unwrap();
        let products = ProductRepository::new(service.db.clone());
        products
            .create(ProductCreate {
                name: "Paracetamol".to_string(),
                description: String::new(),
                unit_price: 10.0,
                category: ProductCategory::PainRelief,
                requires_prescription: None,
                stock: Some(2),
                dosages: None,
                purposes: None,
                expiry_date: Some(chrono::Utc::now().date_naive() + chrono::Duration::days(3)),
            })
            .await
            .unwrap();

        let hub = NotificationHub::new(16);
        let mut rx = hub.subscribe();

        run_stock_sweep(&service.db, &hub, 10, 14).await;

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, StoreEvent::StockLow { stock: 2, .. }));
        let second = rx.recv().await.unwrap();
        assert!(matches!(second, StoreEvent::ExpiryApproaching { .. }));
    }
}
