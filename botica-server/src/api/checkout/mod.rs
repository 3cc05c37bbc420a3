//! Checkout API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/checkout", checkout_routes())
}

fn checkout_routes() -> Router<ServerState> {
    Router::new()
        .route("/{shopper_id}/cash", post(handler::checkout_cash))
        .route("/{shopper_id}/ewallet", post(handler::begin_ewallet))
        .route("/ewallet/callback", get(handler::ewallet_callback))
}
