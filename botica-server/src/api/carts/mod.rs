//! Cart API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/carts", cart_routes())
}

fn cart_routes() -> Router<ServerState> {
    Router::new()
        .route("/{shopper_id}", get(handler::get_cart))
        .route("/{shopper_id}/items", post(handler::add_item))
        .route(
            "/{shopper_id}/items/{product_id}",
            put(handler::set_quantity).delete(handler::remove_item),
        )
        .route("/{shopper_id}/quote", post(handler::quote))
}
