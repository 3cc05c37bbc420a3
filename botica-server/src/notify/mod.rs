//! Notification subsystem
//!
//! # 消息流
//!
//! ```text
//! Checkout / Admin ──▶ publish() ──▶ broadcast channel ──▶ Dispatcher
//!                                                      │
//! Inventory sweep ──▶ publish() ──────────────────────┘
//!                                                      ▼
//!                                        token registry ▶ PushGateway
//! ```
//!
//! Delivery is at-most-once by construction: publishing never blocks, a
//! lagged subscriber drops events, and push failures are logged and
//! swallowed. Nothing in this module can fail a checkout.

pub mod dispatcher;
pub mod push;

pub use dispatcher::Dispatcher;
pub use push::{FcmPushGateway, NoopPushGateway, PushError, PushGateway};

use shared::StoreEvent;
use tokio::sync::broadcast;

/// In-process event channel for store events
#[derive(Clone, Debug)]
pub struct NotificationHub {
    tx: broadcast::Sender<StoreEvent>,
}

impl NotificationHub {
    /// Create a hub with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers (best-effort).
    ///
    /// With no subscriber attached the event is dropped; that is fine, the
    /// pipeline must never depend on delivery.
    pub fn publish(&self, event: StoreEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::debug!(error = %e, "Store event dropped (no subscribers)");
        }
    }

    /// Subscribe to store events from this point forward
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(1024)
    }
}
