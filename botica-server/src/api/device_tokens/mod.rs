//! Device Token API 模块

mod handler;

use axum::{Router, routing::put};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/device-tokens/{owner_id}", put(handler::register))
}
