//! Database Module
//!
//! Embedded SurrealDB: RocksDB backend in production, in-memory backend for
//! tests. Collections: `products`, `carts` (keyed by shopper id),
//! `transactions` (orders), `device_tokens`.

pub mod models;
pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use crate::utils::AppError;

const NAMESPACE: &str = "botica";
const DATABASE: &str = "store";

/// Database service that owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open the on-disk database at `db_path`
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        Self::prepare(db).await
    }

    /// Open an in-memory database (tests, throwaway environments)
    pub async fn open_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;

        Self::prepare(db).await
    }

    async fn prepare(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        define_schema(&db).await?;

        tracing::info!("Database connection established");

        Ok(Self { db })
    }
}

/// Define tables and the indexes the list views depend on.
///
/// Statements are idempotent (`IF NOT EXISTS`), so re-running at every boot
/// is safe.
async fn define_schema(db: &Surreal<Db>) -> Result<(), AppError> {
    db.query(
        "
        DEFINE TABLE IF NOT EXISTS products SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS carts SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS transactions SCHEMALESS;
        DEFINE TABLE IF NOT EXISTS device_tokens SCHEMALESS;
        DEFINE INDEX IF NOT EXISTS transactions_shopper ON TABLE transactions COLUMNS shopper_id;
        DEFINE INDEX IF NOT EXISTS transactions_status ON TABLE transactions COLUMNS checkout_status;
        ",
    )
    .await
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?
    .check()
    .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let service = DbService::open_in_memory().await.unwrap();
        service.db.query("RETURN 1").await.unwrap();
    }

    #[tokio::test]
    async fn test_open_on_disk_in_temp_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("botica.db");
        let service = DbService::new(&path.to_string_lossy()).await.unwrap();
        service.db.query("RETURN 1").await.unwrap();
    }
}
