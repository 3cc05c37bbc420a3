//! Order API Handlers
//!
//! Read views for history UIs plus the admin confirm action. Monetary
//! fields and the line snapshot are immutable; only the status moves, and
//! only PROCESSING -> CONFIRMED.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::models::Order;
use crate::db::repository::OrderRepository;
use crate::utils::{AppError, AppResult};
use shared::{CheckoutStatus, StoreEvent};

/// GET /api/orders/{id} - 获取订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = OrderRepository::new(state.db.clone())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;
    Ok(Json(order))
}

/// GET /api/orders/by-shopper/{shopper_id} - 按顾客查询订单
pub async fn list_by_shopper(
    State(state): State<ServerState>,
    Path(shopper_id): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.db.clone())
        .list_by_shopper(&shopper_id)
        .await?;
    Ok(Json(orders))
}

/// GET /api/orders/by-status/{status} - 按状态查询订单
pub async fn list_by_status(
    State(state): State<ServerState>,
    Path(status): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    let status: CheckoutStatus = status
        .parse()
        .map_err(|e: String| AppError::validation(e))?;
    let orders = OrderRepository::new(state.db.clone())
        .list_by_status(status)
        .await?;
    Ok(Json(orders))
}

/// POST /api/orders/{id}/confirm - 管理员确认订单 (单向，终态)
pub async fn confirm(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = OrderRepository::new(state.db.clone())
        .update_status(&id, CheckoutStatus::Confirmed)
        .await?;

    state.hub.publish(StoreEvent::OrderConfirmed {
        order_id: id,
        shopper_id: order.shopper_id.clone(),
    });

    Ok(Json(order))
}
