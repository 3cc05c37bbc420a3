//! Product API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/products", product_routes())
}

fn product_routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/restock", post(handler::restock))
        .route("/{id}/adjust", post(handler::adjust))
        .route("/alerts/low-stock", get(handler::list_low_stock))
        .route("/alerts/nearing-expiry", get(handler::list_nearing_expiry))
}
