//! Checkout API Handlers
//!
//! The single place where checkout errors become HTTP responses: validation
//! problems surface inline, conflicts as 409 with the product named,
//! persistence failures as retryable 500s.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};
use serde::Deserialize;

use crate::checkout::{EwalletSession, FinalizeOutcome, verify_callback_signature};
use crate::core::ServerState;
use crate::db::models::Order;
use crate::utils::{AppError, AppResponse, AppResult, ok_with_message};

/// Checkout payload (both methods)
#[derive(Debug, Deserialize, Default)]
pub struct CheckoutPayload {
    pub voucher_code: Option<String>,
}

/// Callback query parameters
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub order_id: String,
}

/// POST /api/checkout/{shopper_id}/cash - 现金结账
///
/// Returns the created order for the confirmation view.
pub async fn checkout_cash(
    State(state): State<ServerState>,
    Path(shopper_id): Path<String>,
    Json(payload): Json<CheckoutPayload>,
) -> AppResult<Json<Order>> {
    let order = state
        .checkout()
        .checkout_cash(&shopper_id, payload.voucher_code.as_deref())
        .await?;
    Ok(Json(order))
}

/// POST /api/checkout/{shopper_id}/ewallet - 创建电子钱包支付会话
///
/// Returns the hosted redirect; the order stays AWAITING_PAYMENT until the
/// gateway calls back.
pub async fn begin_ewallet(
    State(state): State<ServerState>,
    Path(shopper_id): Path<String>,
    Json(payload): Json<CheckoutPayload>,
) -> AppResult<Json<EwalletSession>> {
    let session = state
        .checkout()
        .begin_ewallet(
            &shopper_id,
            payload.voucher_code.as_deref(),
            state.ewallet.as_ref(),
        )
        .await?;
    Ok(Json(session))
}

/// GET /api/checkout/ewallet/callback?order_id=... - 支付回调
///
/// May be invoked more than once for the same order (redelivery, browser
/// back-navigation); repeats are a no-op.
pub async fn ewallet_callback(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> AppResult<Json<AppResponse<Order>>> {
    let secret = &state.config.ewallet_webhook_secret;
    if !secret.is_empty() {
        let signature = headers
            .get("x-callback-signature")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::validation("Missing callback signature"))?;
        verify_callback_signature(params.order_id.as_bytes(), signature, secret)
            .map_err(AppError::validation)?;
    }

    match state.checkout().finalize_ewallet(&params.order_id).await? {
        FinalizeOutcome::Finalized(order) => Ok(ok_with_message(order, "Payment confirmed")),
        FinalizeOutcome::AlreadyFinalized(order) => {
            Ok(ok_with_message(order, "Order already finalized"))
        }
    }
}
