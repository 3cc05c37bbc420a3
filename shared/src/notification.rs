//! Store events and push payloads
//!
//! `StoreEvent` is the in-process event-channel payload published by the
//! checkout pipeline and the inventory sweep; the dispatcher turns events
//! into `PushNotification`s for the delivery gateway. Delivery is
//! at-most-once: a lagged subscriber drops events instead of blocking the
//! publisher.

use serde::{Deserialize, Serialize};

use crate::types::PaymentMethod;

/// Events published on the notification hub
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreEvent {
    /// A checkout committed (stock reserved, order persisted)
    OrderPlaced {
        order_id: String,
        shopper_id: String,
        payment_method: PaymentMethod,
        total: f64,
    },
    /// An admin confirmed an order
    OrderConfirmed {
        order_id: String,
        shopper_id: String,
    },
    /// A product fell below the low-stock threshold
    StockLow {
        product_id: String,
        name: String,
        stock: i64,
    },
    /// A product's expiry date entered the lookahead window
    ExpiryApproaching {
        product_id: String,
        name: String,
        expiry_date: String,
    },
}

/// A rendered push message for one recipient token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    /// Extra metadata delivered with the push (e.g. order_id for admins)
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl PushNotification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: serde_json::Map::new(),
        }
    }

    pub fn with_data(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}
