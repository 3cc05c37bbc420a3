//! Push delivery gateway
//!
//! REST integration with the push-notification platform (no SDK
//! dependency). Failures are reported to the caller but are always
//! non-fatal to the enclosing operation.

use async_trait::async_trait;
use shared::PushNotification;

#[derive(Debug, thiserror::Error)]
pub enum PushError {
    #[error("push request failed: {0}")]
    Request(String),

    #[error("push rejected: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for PushError {
    fn from(e: reqwest::Error) -> Self {
        PushError::Request(e.to_string())
    }
}

/// External push delivery collaborator
#[async_trait]
pub trait PushGateway: Send + Sync + std::fmt::Debug {
    async fn send(&self, token: &str, notification: &PushNotification) -> Result<(), PushError>;
}

/// FCM-style HTTP gateway
#[derive(Debug, Clone)]
pub struct FcmPushGateway {
    api_url: String,
    server_key: String,
    client: reqwest::Client,
}

impl FcmPushGateway {
    pub fn new(api_url: impl Into<String>, server_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            server_key: server_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PushGateway for FcmPushGateway {
    async fn send(&self, token: &str, notification: &PushNotification) -> Result<(), PushError> {
        let resp = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("key={}", self.server_key))
            .json(&serde_json::json!({
                "to": token,
                "notification": {
                    "title": notification.title,
                    "body": notification.body,
                },
                "data": notification.data,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(PushError::Rejected(format!("HTTP {status}: {body}")));
        }

        tracing::debug!(title = %notification.title, "Push delivered");
        Ok(())
    }
}

/// No-network gateway for development and tests; logs instead of sending
#[derive(Debug, Clone, Default)]
pub struct NoopPushGateway;

#[async_trait]
impl PushGateway for NoopPushGateway {
    async fn send(&self, token: &str, notification: &PushNotification) -> Result<(), PushError> {
        tracing::info!(
            token = %token,
            title = %notification.title,
            body = %notification.body,
            "Push delivery disabled, logging only"
        );
        Ok(())
    }
}
