//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`carts`] - 购物车接口
//! - [`checkout`] - 结账接口 (现金 / 电子钱包)
//! - [`products`] - 商品与库存管理接口
//! - [`orders`] - 订单查询与确认接口
//! - [`device_tokens`] - 推送令牌注册接口

pub mod carts;
pub mod checkout;
pub mod device_tokens;
pub mod health;
pub mod orders;
pub mod products;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(carts::router())
        .merge(checkout::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(device_tokens::router())
}

/// Build a fully configured application with middleware and state
pub fn build_app(state: ServerState) -> Router {
    build_router()
        // CORS - the storefront and admin console are separate origins
        .layer(CorsLayer::permissive())
        // Request tracing
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
