//! Product Repository
//!
//! Catalogue CRUD plus the inventory operations: guarded stock adjustment
//! and the low-stock / nearing-expiry admin views.

use chrono::{Duration, NaiveDate, Utc};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Product, ProductCreate, ProductUpdate};

pub const PRODUCT_TABLE: &str = "products";

// =============================================================================
// Product Repository
// =============================================================================

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all active products
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM products WHERE is_active = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let product: Option<Product> = self.base.db().select((PRODUCT_TABLE, id)).await?;
        Ok(product)
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if !data.unit_price.is_finite() || data.unit_price < 0.0 {
            return Err(RepoError::Validation(
                "unit_price must be a non-negative number".into(),
            ));
        }
        if data.stock.is_some_and(|s| s < 0) {
            return Err(RepoError::Validation("stock must be non-negative".into()));
        }

        let product = Product {
            id: None,
            name: data.name,
            description: data.description,
            unit_price: data.unit_price,
            category: data.category,
            requires_prescription: data.requires_prescription.unwrap_or(false),
            stock: data.stock.unwrap_or(0),
            dosages: data.dosages.unwrap_or_default(),
            purposes: data.purposes.unwrap_or_default(),
            expiry_date: data.expiry_date,
            is_active: true,
            created_at: Utc::now().to_rfc3339(),
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update catalogue fields of a product
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let thing = RecordId::from_table_key(PRODUCT_TABLE, id);

        // Build dynamic SET clauses with proper type bindings
        let mut set_parts: Vec<&str> = Vec::new();

        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.unit_price.is_some() {
            set_parts.push("unit_price = $unit_price");
        }
        if data.category.is_some() {
            set_parts.push("category = $category");
        }
        if data.requires_prescription.is_some() {
            set_parts.push("requires_prescription = $requires_prescription");
        }
        if data.dosages.is_some() {
            set_parts.push("dosages = $dosages");
        }
        if data.purposes.is_some() {
            set_parts.push("purposes = $purposes");
        }
        if data.expiry_date.is_some() {
            set_parts.push("expiry_date = $expiry_date");
        }
        if data.is_active.is_some() {
            set_parts.push("is_active = $is_active");
        }

        if set_parts.is_empty() {
            // No fields to update
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }

        if data.unit_price.is_some_and(|p| !p.is_finite() || p < 0.0) {
            return Err(RepoError::Validation(
                "unit_price must be a non-negative number".into(),
            ));
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));

        let mut query = self.base.db().query(&query_str).bind(("thing", thing));

        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }
        if let Some(v) = data.unit_price {
            query = query.bind(("unit_price", v));
        }
        if let Some(v) = data.category {
            query = query.bind(("category", v));
        }
        if let Some(v) = data.requires_prescription {
            query = query.bind(("requires_prescription", v));
        }
        if let Some(v) = data.dosages {
            query = query.bind(("dosages", v));
        }
        if let Some(v) = data.purposes {
            query = query.bind(("purposes", v));
        }
        if let Some(v) = data.expiry_date {
            query = query.bind(("expiry_date", v));
        }
        if let Some(v) = data.is_active {
            query = query.bind(("is_active", v));
        }

        let mut result = query.await?;
        let products: Vec<Product> = result.take(0)?;

        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete a product (admin-only, out of the checkout hot path)
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let result: Option<Product> = self.base.db().delete((PRODUCT_TABLE, id)).await?;
        if result.is_none() {
            return Err(RepoError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // Inventory operations
    // =========================================================================

    /// Current stock level
    pub async fn get_stock(&self, id: &str) -> RepoResult<i64> {
        self.find_by_id(id)
            .await?
            .map(|p| p.stock)
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Apply a stock delta (positive for inbound/restock, negative for
    /// outbound). The write is conditional so the non-negative invariant
    /// holds even under concurrent adjustments.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> RepoResult<Product> {
        let thing = RecordId::from_table_key(PRODUCT_TABLE, id);
        let mut result = self
            .base
            .db()
            .query("UPDATE $thing SET stock += $delta WHERE stock + $delta >= 0 RETURN AFTER")
            .bind(("thing", thing))
            .bind(("delta", delta))
            .await?;
        let updated: Vec<Product> = result.take(0)?;

        if let Some(product) = updated.into_iter().next() {
            return Ok(product);
        }

        // Guard failed: either the product is missing or the delta would
        // push stock below zero.
        match self.find_by_id(id).await? {
            Some(_) => Err(RepoError::NegativeStock {
                product_id: id.to_string(),
            }),
            None => Err(RepoError::NotFound(format!("Product {} not found", id))),
        }
    }

    /// Inbound restock (positive quantities only)
    pub async fn restock(&self, id: &str, quantity: i64) -> RepoResult<Product> {
        if quantity <= 0 {
            return Err(RepoError::Validation(format!(
                "restock quantity must be positive, got {}",
                quantity
            )));
        }
        self.adjust_stock(id, quantity).await
    }

    /// Active products with stock below `threshold`
    pub async fn list_low_stock(&self, threshold: i64) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM products WHERE is_active = true AND stock < $threshold ORDER BY stock")
            .bind(("threshold", threshold))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Active products whose expiry date falls within `[today, today + window_days]`
    pub async fn list_nearing_expiry(&self, window_days: i64) -> RepoResult<Vec<Product>> {
        let today: NaiveDate = Utc::now().date_naive();
        let until = today + Duration::days(window_days);

        let products: Vec<Product> = self
            .base
            .db()
            .query(
                "SELECT * FROM products WHERE is_active = true AND expiry_date != NONE \
                 AND expiry_date >= $from AND expiry_date <= $until ORDER BY expiry_date",
            )
            .bind(("from", today))
            .bind(("until", until))
            .await?
            .take(0)?;
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::ProductCategory;

    async fn repo() -> ProductRepository {
        let service = DbService::open_in_memory().await.unwrap();
        ProductRepository::new(service.db)
    }

    fn paracetamol(stock: i64) -> ProductCreate {
        ProductCreate {
            name: "Paracetamol".to_string(),
            description: "Fever and pain relief".to_string(),
            unit_price: 12.50,
            category: ProductCategory::PainRelief,
            requires_prescription: Some(false),
            stock: Some(stock),
            dosages: Some(vec!["250mg".to_string(), "500mg".to_string()]),
            purposes: Some(vec!["fever".to_string()]),
            expiry_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_stock() {
        let repo = repo().await;
        let product = repo.create(paracetamol(25)).await.unwrap();
        assert_eq!(product.stock, 25);
        assert!(product.is_active);

        let stock = repo.get_stock(&product.key()).await.unwrap();
        assert_eq!(stock, 25);
    }

    #[tokio::test]
    async fn test_create_rejects_negative_stock() {
        let repo = repo().await;
        let mut data = paracetamol(0);
        data.stock = Some(-1);
        assert!(matches!(
            repo.create(data).await,
            Err(RepoError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_adjust_stock_applies_delta() {
        let repo = repo().await;
        let product = repo.create(paracetamol(10)).await.unwrap();
        let key = product.key();

        let updated = repo.adjust_stock(&key, -4).await.unwrap();
        assert_eq!(updated.stock, 6);

        let updated = repo.restock(&key, 14).await.unwrap();
        assert_eq!(updated.stock, 20);
    }

    #[tokio::test]
    async fn test_adjust_stock_rejects_negative_result() {
        let repo = repo().await;
        let product = repo.create(paracetamol(3)).await.unwrap();
        let key = product.key();

        let err = repo.adjust_stock(&key, -4).await.unwrap_err();
        assert!(matches!(err, RepoError::NegativeStock { .. }));

        // Stock untouched after the rejected adjustment
        assert_eq!(repo.get_stock(&key).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_adjust_stock_missing_product() {
        let repo = repo().await;
        let err = repo.adjust_stock("nope", -1).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_restock_rejects_non_positive() {
        let repo = repo().await;
        let product = repo.create(paracetamol(1)).await.unwrap();
        assert!(matches!(
            repo.restock(&product.key(), 0).await,
            Err(RepoError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_list_low_stock() {
        let repo = repo().await;
        repo.create(paracetamol(3)).await.unwrap();
        let mut plenty = paracetamol(50);
        plenty.name = "Vitamin C".to_string();
        plenty.category = ProductCategory::VitaminsAndSupplements;
        repo.create(plenty).await.unwrap();

        let low = repo.list_low_stock(10).await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Paracetamol");
    }

    #[tokio::test]
    async fn test_list_nearing_expiry() {
        let repo = repo().await;
        let today = Utc::now().date_naive();

        let mut soon = paracetamol(5);
        soon.name = "Amoxicillin".to_string();
        soon.expiry_date = Some(today + Duration::days(7));
        repo.create(soon).await.unwrap();

        let mut far = paracetamol(5);
        far.name = "Ibuprofen".to_string();
        far.expiry_date = Some(today + Duration::days(90));
        repo.create(far).await.unwrap();

        // No expiry date at all
        repo.create(paracetamol(5)).await.unwrap();

        let nearing = repo.list_nearing_expiry(14).await.unwrap();
        assert_eq!(nearing.len(), 1);
        assert_eq!(nearing[0].name, "Amoxicillin");
    }

    #[tokio::test]
    async fn test_update_catalogue_fields() {
        let repo = repo().await;
        let product = repo.create(paracetamol(10)).await.unwrap();

        let updated = repo
            .update(
                &product.key(),
                ProductUpdate {
                    unit_price: Some(13.75),
                    description: Some("Updated".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.unit_price, 13.75);
        assert_eq!(updated.description, "Updated");
        // Stock untouched by catalogue updates
        assert_eq!(updated.stock, 10);
    }

    #[tokio::test]
    async fn test_delete_missing_product() {
        let repo = repo().await;
        assert!(matches!(
            repo.delete("missing").await,
            Err(RepoError::NotFound(_))
        ));
    }
}
