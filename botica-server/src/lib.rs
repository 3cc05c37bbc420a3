//! Botica Server - 药房线上商店后端
//!
//! # 架构概述
//!
//! 本模块是 Botica 后端的主入口，提供以下核心功能：
//!
//! - **结账流水线** (`checkout`): 库存预留、订单落库、购物车清空的原子提交
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储 (products / carts / transactions)
//! - **通知** (`notify`): 店铺事件通道 + 推送分发
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! botica-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── db/            # 数据库层 (models + repositories)
//! ├── checkout/      # 结账编排、定价、支付网关
//! ├── notify/        # 事件通道、推送网关、分发器
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod checkout;
pub mod core;
pub mod db;
pub mod notify;
pub mod utils;

// Re-export 公共类型
pub use checkout::{CheckoutError, CheckoutService, FinalizeOutcome};
pub use core::{Config, Server, ServerState};
pub use notify::NotificationHub;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv, 工作目录, 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.log_dir();
    init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        log_dir.to_str(),
    );

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____        __  _
   / __ )____  / /_(_)________ _
  / __  / __ \/ __/ / ___/ __ `/
 / /_/ / /_/ / /_/ / /__/ /_/ /
/_____/\____/\__/_/\___/\__,_/
    "#
    );
}
