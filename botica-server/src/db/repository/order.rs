//! Order Repository
//!
//! Append-style store over the `transactions` collection. Records are
//! created once by the checkout pipeline; afterwards only `checkout_status`
//! may move, and only along `PROCESSING -> CONFIRMED`.

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::RecordId;
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Order;
use shared::CheckoutStatus;

pub const ORDER_TABLE: &str = "transactions";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a new order under a fresh uuid key
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let key = Uuid::new_v4().to_string();
        let created: Option<Order> = self
            .base
            .db()
            .create((ORDER_TABLE, key.as_str()))
            .content(order)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by record key
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select((ORDER_TABLE, id)).await?;
        Ok(order)
    }

    /// Orders of one shopper, newest first
    pub async fn list_by_shopper(&self, shopper_id: &str) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM transactions WHERE shopper_id = $sid ORDER BY created_at DESC")
            .bind(("sid", shopper_id.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Orders in a given status, newest first
    pub async fn list_by_status(&self, status: CheckoutStatus) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM transactions WHERE checkout_status = $status ORDER BY created_at DESC",
            )
            .bind(("status", status))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// One-way status transition.
    ///
    /// The typed check rejects anything but `PROCESSING -> CONFIRMED`; the
    /// conditional write keeps the transition atomic against a concurrent
    /// confirm of the same order.
    pub async fn update_status(&self, id: &str, new_status: CheckoutStatus) -> RepoResult<Order> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))?;

        if !current.checkout_status.can_transition_to(new_status) {
            return Err(RepoError::InvalidTransition {
                from: current.checkout_status.to_string(),
                to: new_status.to_string(),
            });
        }

        let thing = RecordId::from_table_key(ORDER_TABLE, id);
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET checkout_status = $next WHERE checkout_status = $expected RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("next", new_status))
            .bind(("expected", current.checkout_status))
            .await?;
        let updated: Vec<Order> = result.take(0)?;

        updated
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::InvalidTransition {
                from: current.checkout_status.to_string(),
                to: new_status.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::{CartLine, PaymentMethod, PricingBreakdown};

    async fn repo() -> OrderRepository {
        let service = DbService::open_in_memory().await.unwrap();
        OrderRepository::new(service.db)
    }

    fn sample_order(shopper: &str, status: CheckoutStatus) -> Order {
        let lines = vec![CartLine {
            product_id: "p1".to_string(),
            name: "Paracetamol".to_string(),
            unit_price: 100.0,
            quantity: 2,
            dosage: None,
        }];
        let pricing = PricingBreakdown {
            subtotal: 200.0,
            discount_rate: 0.05,
            discount: 10.0,
            tax: 22.8,
            total: 212.8,
            voucher_applied: false,
        };
        Order::from_snapshot(shopper, PaymentMethod::Cash, lines, &pricing, status)
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let repo = repo().await;
        let a = repo
            .create(sample_order("maria", CheckoutStatus::Processing))
            .await
            .unwrap();
        let b = repo
            .create(sample_order("maria", CheckoutStatus::Processing))
            .await
            .unwrap();

        assert_ne!(a.key(), b.key());

        let found = repo.find_by_id(&a.key()).await.unwrap().unwrap();
        assert_eq!(found.total, 212.8);
        assert_eq!(found.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_list_by_shopper_and_status() {
        let repo = repo().await;
        repo.create(sample_order("maria", CheckoutStatus::Processing))
            .await
            .unwrap();
        repo.create(sample_order("maria", CheckoutStatus::AwaitingPayment))
            .await
            .unwrap();
        repo.create(sample_order("jose", CheckoutStatus::Processing))
            .await
            .unwrap();

        assert_eq!(repo.list_by_shopper("maria").await.unwrap().len(), 2);
        assert_eq!(
            repo.list_by_status(CheckoutStatus::Processing)
                .await
                .unwrap()
                .len(),
            2
        );
        // Abandoned e-wallet orders stay observable for reconciliation
        assert_eq!(
            repo.list_by_status(CheckoutStatus::AwaitingPayment)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_confirm_processing_order() {
        let repo = repo().await;
        let order = repo
            .create(sample_order("maria", CheckoutStatus::Processing))
            .await
            .unwrap();

        let confirmed = repo
            .update_status(&order.key(), CheckoutStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.checkout_status, CheckoutStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_confirmed_is_terminal() {
        let repo = repo().await;
        let order = repo
            .create(sample_order("maria", CheckoutStatus::Processing))
            .await
            .unwrap();
        let key = order.key();

        repo.update_status(&key, CheckoutStatus::Confirmed)
            .await
            .unwrap();

        // Confirmed -> Processing is rejected
        let err = repo
            .update_status(&key, CheckoutStatus::Processing)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidTransition { .. }));

        // So is a second confirm
        let err = repo
            .update_status(&key, CheckoutStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_awaiting_payment_cannot_be_confirmed() {
        let repo = repo().await;
        let order = repo
            .create(sample_order("maria", CheckoutStatus::AwaitingPayment))
            .await
            .unwrap();

        let err = repo
            .update_status(&order.key(), CheckoutStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_update_status_missing_order() {
        let repo = repo().await;
        let err = repo
            .update_status("missing", CheckoutStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
