//! Cart Repository
//!
//! 购物车以 shopper id 为记录键，惰性创建。
//! Stock is NOT checked here; availability is validated at checkout.

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Cart;
use shared::CartLine;

pub const CART_TABLE: &str = "carts";

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Current cart; an empty cart is a valid, non-error result
    pub async fn get(&self, shopper_id: &str) -> RepoResult<Cart> {
        let cart: Option<Cart> = self.base.db().select((CART_TABLE, shopper_id)).await?;
        Ok(cart.unwrap_or_default())
    }

    /// Add a line; merges into an existing line when product and dosage match
    pub async fn add_item(&self, shopper_id: &str, line: CartLine) -> RepoResult<Cart> {
        if line.quantity <= 0 {
            return Err(RepoError::Validation(format!(
                "quantity must be positive, got {}",
                line.quantity
            )));
        }
        if !line.unit_price.is_finite() || line.unit_price < 0.0 {
            return Err(RepoError::Validation(
                "unit_price must be a non-negative number".into(),
            ));
        }

        let mut cart = self.get(shopper_id).await?;
        match cart
            .lines
            .iter_mut()
            .find(|l| l.merges_with(&line.product_id, line.dosage.as_deref()))
        {
            Some(existing) => existing.quantity += line.quantity,
            None => cart.lines.push(line),
        }

        self.save(shopper_id, cart).await
    }

    /// Delete the matching line; a missing line is a silent no-op
    pub async fn remove_item(&self, shopper_id: &str, product_id: &str) -> RepoResult<Cart> {
        let mut cart = self.get(shopper_id).await?;
        let before = cart.lines.len();
        cart.lines.retain(|l| l.product_id != product_id);

        if cart.lines.len() == before {
            return Ok(cart);
        }
        self.save(shopper_id, cart).await
    }

    /// Set a line's quantity, clamped to a minimum of 1.
    ///
    /// Decrementing below 1 keeps the line at quantity 1; removal stays an
    /// explicit `remove_item`. A missing line is a silent no-op.
    pub async fn set_quantity(
        &self,
        shopper_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> RepoResult<Cart> {
        let mut cart = self.get(shopper_id).await?;
        let Some(line) = cart.lines.iter_mut().find(|l| l.product_id == product_id) else {
            return Ok(cart);
        };
        line.quantity = quantity.max(1);

        self.save(shopper_id, cart).await
    }

    /// Empty the cart (the record itself is kept)
    pub async fn clear(&self, shopper_id: &str) -> RepoResult<Cart> {
        let mut cart = self.get(shopper_id).await?;
        cart.lines.clear();
        self.save(shopper_id, cart).await
    }

    async fn save(&self, shopper_id: &str, mut cart: Cart) -> RepoResult<Cart> {
        // The record key is addressed by the resource path, not the content
        cart.id = None;
        cart.updated_at = Utc::now().to_rfc3339();

        let saved: Option<Cart> = self
            .base
            .db()
            .upsert((CART_TABLE, shopper_id))
            .content(cart)
            .await?;
        saved.ok_or_else(|| RepoError::Database("Failed to save cart".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn repo() -> CartRepository {
        let service = DbService::open_in_memory().await.unwrap();
        CartRepository::new(service.db)
    }

    fn line(product_id: &str, quantity: i64, dosage: Option<&str>) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            name: format!("Product {product_id}"),
            unit_price: 10.0,
            quantity,
            dosage: dosage.map(String::from),
        }
    }

    #[tokio::test]
    async fn test_get_missing_cart_is_empty() {
        let repo = repo().await;
        let cart = repo.get("maria").await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_add_item_merges_on_product_and_dosage() {
        let repo = repo().await;
        repo.add_item("maria", line("p1", 2, Some("500mg"))).await.unwrap();
        let cart = repo.add_item("maria", line("p1", 3, Some("500mg"))).await.unwrap();

        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_add_item_different_dosage_is_new_line() {
        let repo = repo().await;
        repo.add_item("maria", line("p1", 1, Some("250mg"))).await.unwrap();
        let cart = repo.add_item("maria", line("p1", 1, Some("500mg"))).await.unwrap();

        assert_eq!(cart.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_add_item_rejects_non_positive_quantity() {
        let repo = repo().await;
        assert!(matches!(
            repo.add_item("maria", line("p1", 0, None)).await,
            Err(RepoError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_item_is_silent_when_absent() {
        let repo = repo().await;
        repo.add_item("maria", line("p1", 1, None)).await.unwrap();

        let cart = repo.remove_item("maria", "p2").await.unwrap();
        assert_eq!(cart.lines.len(), 1);

        let cart = repo.remove_item("maria", "p1").await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_set_quantity_clamps_to_one() {
        let repo = repo().await;
        repo.add_item("maria", line("p1", 5, None)).await.unwrap();

        let cart = repo.set_quantity("maria", "p1", 0).await.unwrap();
        assert_eq!(cart.lines[0].quantity, 1);

        let cart = repo.set_quantity("maria", "p1", 7).await.unwrap();
        assert_eq!(cart.lines[0].quantity, 7);
    }

    #[tokio::test]
    async fn test_set_quantity_missing_line_is_noop() {
        let repo = repo().await;
        repo.add_item("maria", line("p1", 2, None)).await.unwrap();

        let cart = repo.set_quantity("maria", "p9", 4).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_clear_keeps_empty_cart() {
        let repo = repo().await;
        repo.add_item("maria", line("p1", 2, None)).await.unwrap();
        let cart = repo.clear("maria").await.unwrap();
        assert!(cart.is_empty());

        // Carts stay isolated per shopper
        let other = repo.get("jose").await.unwrap();
        assert!(other.is_empty());
    }
}
