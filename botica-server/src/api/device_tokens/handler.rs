//! Device Token API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::DeviceToken;
use crate::db::repository::DeviceTokenRepository;
use crate::utils::AppResult;

/// PUT /api/device-tokens/{owner_id} payload
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(length(min = 1))]
    pub token: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// PUT /api/device-tokens/{owner_id} - 注册推送令牌 (覆盖旧令牌)
pub async fn register(
    State(state): State<ServerState>,
    Path(owner_id): Path<String>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<Json<DeviceToken>> {
    payload.validate()?;
    let token = DeviceTokenRepository::new(state.db.clone())
        .register(&owner_id, &payload.token, payload.is_admin)
        .await?;
    Ok(Json(token))
}
