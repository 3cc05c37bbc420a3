//! Server configuration

use std::path::PathBuf;

/// 服务器配置 - 所有配置项都可以通过环境变量覆盖
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/botica | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | VOUCHER_CODE | BOTICA10 | 识别的折扣码 (区分大小写) |
/// | VOUCHER_RATE | 0.10 | 折扣码对应的折扣率 |
/// | EWALLET_MIN_TOTAL | 30.0 | 电子钱包最低订单金额 |
/// | EWALLET_API_URL | https://api.ewallet.example/v1 | 托管支付网关地址 |
/// | EWALLET_SECRET_KEY | (empty) | 网关密钥 |
/// | EWALLET_WEBHOOK_SECRET | (empty) | 回调签名密钥 |
/// | CALLBACK_BASE_URL | http://localhost:3000 | 回调地址前缀 |
/// | PUSH_API_URL | (empty, push disabled) | 推送网关地址 |
/// | PUSH_SERVER_KEY | (empty) | 推送网关密钥 |
/// | LOW_STOCK_THRESHOLD | 10 | 低库存告警阈值 |
/// | EXPIRY_WINDOW_DAYS | 14 | 临期告警窗口 (天) |
/// | STOCK_SWEEP_INTERVAL_SECS | 3600 | 库存巡检周期 (秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/botica HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === Pricing ===
    /// Recognized voucher code (case-sensitive, single code)
    pub voucher_code: String,
    /// Discount rate granted by the voucher
    pub voucher_rate: f64,

    // === E-wallet gateway ===
    /// Minimum order total for e-wallet checkout
    pub ewallet_min_total: f64,
    /// Hosted checkout API base URL
    pub ewallet_api_url: String,
    /// Gateway secret key
    pub ewallet_secret_key: String,
    /// Shared secret for callback signature verification
    pub ewallet_webhook_secret: String,
    /// Base URL the gateway redirects back to
    pub callback_base_url: String,

    // === Push delivery ===
    /// Push gateway endpoint; empty disables delivery (events still logged)
    pub push_api_url: String,
    /// Push gateway server key
    pub push_server_key: String,

    // === Inventory alerts ===
    /// Stock level below which a product is reported low
    pub low_stock_threshold: i64,
    /// Days ahead an expiry date is reported as approaching
    pub expiry_window_days: i64,
    /// Interval between inventory alert sweeps, in seconds
    pub stock_sweep_interval_secs: u64,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/botica".into()),
            http_port: env_parse("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            voucher_code: std::env::var("VOUCHER_CODE").unwrap_or_else(|_| "BOTICA10".into()),
            voucher_rate: env_parse("VOUCHER_RATE", 0.10),

            ewallet_min_total: env_parse("EWALLET_MIN_TOTAL", 30.0),
            ewallet_api_url: std::env::var("EWALLET_API_URL")
                .unwrap_or_else(|_| "https://api.ewallet.example/v1".into()),
            ewallet_secret_key: std::env::var("EWALLET_SECRET_KEY").unwrap_or_default(),
            ewallet_webhook_secret: std::env::var("EWALLET_WEBHOOK_SECRET").unwrap_or_default(),
            callback_base_url: std::env::var("CALLBACK_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            push_api_url: std::env::var("PUSH_API_URL").unwrap_or_default(),
            push_server_key: std::env::var("PUSH_SERVER_KEY").unwrap_or_default(),

            low_stock_threshold: env_parse("LOW_STOCK_THRESHOLD", 10),
            expiry_window_days: env_parse("EXPIRY_WINDOW_DAYS", 14),
            stock_sweep_interval_secs: env_parse("STOCK_SWEEP_INTERVAL_SECS", 3600),
        }
    }

    /// 使用自定义值覆盖部分配置 (常用于测试场景)
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 数据库目录
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录
    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// Ensure the work directory structure exists
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }
}
