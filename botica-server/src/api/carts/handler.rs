//! Cart API Handlers
//!
//! Shopper identity is always an explicit path parameter; there is no
//! ambient identity anywhere in the pipeline.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::Cart;
use crate::db::repository::{CartRepository, ProductRepository};
use crate::utils::{AppError, AppResult};
use shared::{CartLine, PricingBreakdown};

/// POST /api/carts/{shopper_id}/items payload
#[derive(Debug, Deserialize, Validate)]
pub struct AddItemPayload {
    pub product_id: String,
    #[validate(range(min = 1))]
    pub quantity: i64,
    pub dosage: Option<String>,
}

/// PUT /api/carts/{shopper_id}/items/{product_id} payload
#[derive(Debug, Deserialize)]
pub struct SetQuantityPayload {
    pub quantity: i64,
}

/// POST /api/carts/{shopper_id}/quote payload
#[derive(Debug, Deserialize, Default)]
pub struct QuotePayload {
    pub voucher_code: Option<String>,
}

/// GET /api/carts/{shopper_id} - 获取购物车
pub async fn get_cart(
    State(state): State<ServerState>,
    Path(shopper_id): Path<String>,
) -> AppResult<Json<Cart>> {
    let cart = CartRepository::new(state.db.clone()).get(&shopper_id).await?;
    Ok(Json(cart))
}

/// POST /api/carts/{shopper_id}/items - 加入商品
///
/// The line captures the product's current unit price; no stock check
/// happens here (availability is validated at checkout).
pub async fn add_item(
    State(state): State<ServerState>,
    Path(shopper_id): Path<String>,
    Json(payload): Json<AddItemPayload>,
) -> AppResult<Json<Cart>> {
    payload.validate()?;

    let product = ProductRepository::new(state.db.clone())
        .find_by_id(&payload.product_id)
        .await?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::not_found(format!("Product {}", payload.product_id)))?;

    // A selected dosage must be one the product actually offers
    if let Some(dosage) = &payload.dosage
        && !product.dosages.is_empty()
        && !product.dosages.contains(dosage)
    {
        return Err(AppError::validation(format!(
            "Dosage {dosage} is not available for {}",
            product.name
        )));
    }

    let line = CartLine {
        product_id: payload.product_id,
        name: product.name.clone(),
        unit_price: product.unit_price,
        quantity: payload.quantity,
        dosage: payload.dosage,
    };

    let cart = CartRepository::new(state.db.clone())
        .add_item(&shopper_id, line)
        .await?;
    Ok(Json(cart))
}

/// PUT /api/carts/{shopper_id}/items/{product_id} - 调整数量 (最小为 1)
pub async fn set_quantity(
    State(state): State<ServerState>,
    Path((shopper_id, product_id)): Path<(String, String)>,
    Json(payload): Json<SetQuantityPayload>,
) -> AppResult<Json<Cart>> {
    let cart = CartRepository::new(state.db.clone())
        .set_quantity(&shopper_id, &product_id, payload.quantity)
        .await?;
    Ok(Json(cart))
}

/// DELETE /api/carts/{shopper_id}/items/{product_id} - 移除商品
pub async fn remove_item(
    State(state): State<ServerState>,
    Path((shopper_id, product_id)): Path<(String, String)>,
) -> AppResult<Json<Cart>> {
    let cart = CartRepository::new(state.db.clone())
        .remove_item(&shopper_id, &product_id)
        .await?;
    Ok(Json(cart))
}

/// POST /api/carts/{shopper_id}/quote - 价格预览 (可带折扣码)
pub async fn quote(
    State(state): State<ServerState>,
    Path(shopper_id): Path<String>,
    Json(payload): Json<QuotePayload>,
) -> AppResult<Json<PricingBreakdown>> {
    let pricing = state
        .checkout()
        .quote(&shopper_id, payload.voucher_code.as_deref())
        .await?;
    Ok(Json(pricing))
}
