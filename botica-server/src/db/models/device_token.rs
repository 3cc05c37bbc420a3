//! Device Token Model
//!
//! Push recipient registry (`device_tokens` collection, record key = owner
//! id). One token per owner; re-registration overwrites.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::serde_helpers;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceToken {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub owner_id: String,
    pub token: String,
    /// Admin recipients receive order and stock alerts
    #[serde(default)]
    pub is_admin: bool,
    pub updated_at: String,
}
