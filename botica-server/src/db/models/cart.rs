//! Cart Model
//!
//! One record per shopper (`carts` collection, record key = shopper id).
//! Created lazily on first add; cleared, never deleted, after checkout.

use serde::{Deserialize, Serialize};
use shared::CartLine;
use surrealdb::RecordId;

use super::serde_helpers;

/// Cart entity
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Cart {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Lines in insertion order (order is not significant)
    #[serde(default)]
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub updated_at: String,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
