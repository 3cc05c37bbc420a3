//! Product API Handlers
//!
//! Catalogue management plus the admin inventory operations (restock,
//! adjust, alert views). Stock never moves through the catalogue update
//! endpoint.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::ProductRepository;
use crate::utils::{AppError, AppResult};

/// POST /api/products/{id}/restock payload
#[derive(Debug, Deserialize, Validate)]
pub struct RestockPayload {
    #[validate(range(min = 1))]
    pub quantity: i64,
}

/// POST /api/products/{id}/adjust payload
#[derive(Debug, Deserialize)]
pub struct AdjustPayload {
    /// Positive for inbound, negative for outbound
    pub delta: i64,
}

#[derive(Debug, Deserialize, Default)]
pub struct ThresholdQuery {
    pub threshold: Option<i64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ExpiryWindowQuery {
    pub window_days: Option<i64>,
}

/// GET /api/products - 获取所有商品
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.db.clone()).find_all().await?;
    Ok(Json(products))
}

/// GET /api/products/{id} - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let product = ProductRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;
    Ok(Json(product))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    payload.validate()?;
    let product = ProductRepository::new(state.db.clone())
        .create(payload)
        .await?;
    Ok(Json(product))
}

/// PUT /api/products/{id} - 更新商品目录字段
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    payload.validate()?;
    let product = ProductRepository::new(state.db.clone())
        .update(&id, payload)
        .await?;
    Ok(Json(product))
}

/// DELETE /api/products/{id} - 删除商品 (硬删除，不在结账热路径上)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    ProductRepository::new(state.db.clone()).delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// POST /api/products/{id}/restock - 入库
pub async fn restock(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<RestockPayload>,
) -> AppResult<Json<Product>> {
    payload.validate()?;
    let product = ProductRepository::new(state.db.clone())
        .restock(&id, payload.quantity)
        .await?;
    Ok(Json(product))
}

/// POST /api/products/{id}/adjust - 库存调整 (出库为负数)
pub async fn adjust(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<AdjustPayload>,
) -> AppResult<Json<Product>> {
    let product = ProductRepository::new(state.db.clone())
        .adjust_stock(&id, payload.delta)
        .await?;
    Ok(Json(product))
}

/// GET /api/products/alerts/low-stock - 低库存告警视图
pub async fn list_low_stock(
    State(state): State<ServerState>,
    Query(query): Query<ThresholdQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let threshold = query
        .threshold
        .unwrap_or(state.config.low_stock_threshold);
    let products = ProductRepository::new(state.db.clone())
        .list_low_stock(threshold)
        .await?;
    Ok(Json(products))
}

/// GET /api/products/alerts/nearing-expiry - 临期告警视图
pub async fn list_nearing_expiry(
    State(state): State<ServerState>,
    Query(query): Query<ExpiryWindowQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let window = query
        .window_days
        .unwrap_or(state.config.expiry_window_days);
    let products = ProductRepository::new(state.db.clone())
        .list_nearing_expiry(window)
        .await?;
    Ok(Json(products))
}
