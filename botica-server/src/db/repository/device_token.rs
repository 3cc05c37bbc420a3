//! Device Token Repository
//!
//! Push recipient registry; one token per owner, re-registration overwrites.

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::DeviceToken;

const TOKEN_TABLE: &str = "device_tokens";

#[derive(Clone)]
pub struct DeviceTokenRepository {
    base: BaseRepository,
}

impl DeviceTokenRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Register (or replace) the token for an owner
    pub async fn register(
        &self,
        owner_id: &str,
        token: &str,
        is_admin: bool,
    ) -> RepoResult<DeviceToken> {
        if token.is_empty() {
            return Err(RepoError::Validation("token must not be empty".into()));
        }

        let record = DeviceToken {
            id: None,
            owner_id: owner_id.to_string(),
            token: token.to_string(),
            is_admin,
            updated_at: Utc::now().to_rfc3339(),
        };

        let saved: Option<DeviceToken> = self
            .base
            .db()
            .upsert((TOKEN_TABLE, owner_id))
            .content(record)
            .await?;
        saved.ok_or_else(|| RepoError::Database("Failed to save device token".to_string()))
    }

    /// Token of one owner, if registered
    pub async fn find_by_owner(&self, owner_id: &str) -> RepoResult<Option<DeviceToken>> {
        let token: Option<DeviceToken> = self.base.db().select((TOKEN_TABLE, owner_id)).await?;
        Ok(token)
    }

    /// All admin recipient tokens
    pub async fn list_admin_tokens(&self) -> RepoResult<Vec<DeviceToken>> {
        let tokens: Vec<DeviceToken> = self
            .base
            .db()
            .query("SELECT * FROM device_tokens WHERE is_admin = true")
            .await?
            .take(0)?;
        Ok(tokens)
    }
}
