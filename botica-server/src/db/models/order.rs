//! Order Model
//!
//! `transactions` collection. The line snapshot and monetary fields are
//! frozen at creation; only `checkout_status` may change afterwards.

use serde::{Deserialize, Serialize};
use shared::{CartLine, CheckoutStatus, PaymentMethod, PricingBreakdown};
use surrealdb::RecordId;

use super::serde_helpers;

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub shopper_id: String,
    pub payment_method: PaymentMethod,
    /// Frozen copy of the cart at checkout time
    pub lines: Vec<CartLine>,
    pub subtotal: f64,
    pub discount: f64,
    pub tax: f64,
    pub total: f64,
    pub checkout_status: CheckoutStatus,
    pub created_at: String,
}

impl Order {
    /// Build a new order from a cart snapshot and its pricing
    pub fn from_snapshot(
        shopper_id: &str,
        payment_method: PaymentMethod,
        lines: Vec<CartLine>,
        pricing: &PricingBreakdown,
        checkout_status: CheckoutStatus,
    ) -> Self {
        Self {
            id: None,
            shopper_id: shopper_id.to_string(),
            payment_method,
            lines,
            subtotal: pricing.subtotal,
            discount: pricing.discount,
            tax: pricing.tax,
            total: pricing.total,
            checkout_status,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Record key without the table prefix
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }
}
