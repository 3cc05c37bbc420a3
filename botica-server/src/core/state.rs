//! Server state

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use crate::checkout::{
    CheckoutService, EwalletGateway, HostedCheckoutGateway, MockGateway, VoucherPolicy,
};
use crate::core::Config;
use crate::db::DbService;
use crate::notify::dispatcher::spawn_stock_sweep;
use crate::notify::{Dispatcher, FcmPushGateway, NoopPushGateway, NotificationHub, PushGateway};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | 嵌入式数据库 (SurrealDB) |
/// | hub | 店铺事件通道 |
/// | ewallet | 电子钱包托管支付网关 |
/// | push | 推送网关 |
/// | shutdown | 后台任务关闭令牌 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub hub: NotificationHub,
    pub ewallet: Arc<dyn EwalletGateway>,
    pub push: Arc<dyn PushGateway>,
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化服务器状态 (磁盘数据库)
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("botica.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        Self::from_parts(config.clone(), db_service.db)
    }

    /// 初始化服务器状态 (内存数据库，用于测试)
    pub async fn initialize_in_memory(config: &Config) -> Self {
        let db_service = DbService::open_in_memory()
            .await
            .expect("Failed to initialize in-memory database");

        Self::from_parts(config.clone(), db_service.db)
    }

    fn from_parts(config: Config, db: Surreal<Db>) -> Self {
        // Without a gateway secret the hosted flow is stubbed locally; the
        // redirect URL points back at this server.
        let ewallet: Arc<dyn EwalletGateway> = if config.ewallet_secret_key.is_empty() {
            Arc::new(MockGateway::new(config.callback_base_url.clone()))
        } else {
            Arc::new(HostedCheckoutGateway::new(
                config.ewallet_api_url.clone(),
                config.ewallet_secret_key.clone(),
            ))
        };

        let push: Arc<dyn PushGateway> = if config.push_api_url.is_empty() {
            Arc::new(NoopPushGateway)
        } else {
            Arc::new(FcmPushGateway::new(
                config.push_api_url.clone(),
                config.push_server_key.clone(),
            ))
        };

        Self {
            config,
            db,
            hub: NotificationHub::default(),
            ewallet,
            push,
            shutdown: CancellationToken::new(),
        }
    }

    /// Checkout pipeline bound to this state
    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(
            self.db.clone(),
            self.hub.clone(),
            VoucherPolicy {
                code: self.config.voucher_code.clone(),
                rate: self.config.voucher_rate,
            },
            self.config.ewallet_min_total,
            self.config.callback_base_url.clone(),
        )
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用：
    /// - 通知分发器 (Dispatcher)
    /// - 库存巡检 (low stock / nearing expiry)
    pub fn start_background_tasks(&self) {
        let _ = Dispatcher::new(
            self.db.clone(),
            self.push.clone(),
            self.shutdown.child_token(),
        )
        .spawn(&self.hub);

        let _ = spawn_stock_sweep(
            self.db.clone(),
            self.hub.clone(),
            self.config.low_stock_threshold,
            self.config.expiry_window_days,
            self.config.stock_sweep_interval_secs,
            self.shutdown.child_token(),
        );

        tracing::debug!("Background tasks started");
    }
}
