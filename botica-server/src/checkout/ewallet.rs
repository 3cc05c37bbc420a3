//! E-wallet payment collaborator
//!
//! Hosted-checkout integration via REST API (no SDK dependency). The
//! orchestrator never holds a connection open across the redirect: it
//! creates a session here, hands the shopper the redirect URL, and resumes
//! later through the callback entry point keyed by the order id.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use shared::{CartLine, PricingBreakdown};

/// Redirect session returned to the storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EwalletSession {
    pub order_id: String,
    pub redirect_url: String,
}

/// Gateway error, always surfaced to the caller as a retryable failure
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Request(String),

    #[error("gateway response malformed: {0}")]
    Response(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        GatewayError::Request(e.to_string())
    }
}

/// External hosted-checkout collaborator
#[async_trait]
pub trait EwalletGateway: Send + Sync + std::fmt::Debug {
    /// Create a payment session; returns the hosted redirect URL.
    ///
    /// The gateway receives the line snapshot and the computed totals, not
    /// raw cart state, so what the shopper is charged cannot drift from
    /// what checkout later reserves.
    async fn create_session(
        &self,
        order_id: &str,
        lines: &[CartLine],
        pricing: &PricingBreakdown,
        return_url: &str,
    ) -> Result<String, GatewayError>;
}

/// Production gateway speaking to the hosted checkout API
#[derive(Debug, Clone)]
pub struct HostedCheckoutGateway {
    api_url: String,
    secret_key: String,
    client: reqwest::Client,
}

impl HostedCheckoutGateway {
    pub fn new(api_url: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            secret_key: secret_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EwalletGateway for HostedCheckoutGateway {
    async fn create_session(
        &self,
        order_id: &str,
        lines: &[CartLine],
        pricing: &PricingBreakdown,
        return_url: &str,
    ) -> Result<String, GatewayError> {
        let items: Vec<serde_json::Value> = lines
            .iter()
            .map(|l| {
                serde_json::json!({
                    "name": l.name,
                    "quantity": l.quantity,
                    "amount": l.unit_price,
                })
            })
            .collect();

        let resp: serde_json::Value = self
            .client
            .post(format!("{}/checkout/sessions", self.api_url))
            .basic_auth(&self.secret_key, None::<&str>)
            .json(&serde_json::json!({
                "reference": order_id,
                "line_items": items,
                "amount": pricing.total,
                "currency": "PHP",
                "success_url": return_url,
                "cancel_url": return_url,
            }))
            .send()
            .await?
            .json()
            .await?;

        resp["checkout_url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| GatewayError::Response(format!("no checkout_url in {resp}")))
    }
}

/// Local stand-in used in development and tests (no network)
#[derive(Debug, Clone)]
pub struct MockGateway {
    base_url: String,
}

impl MockGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl EwalletGateway for MockGateway {
    async fn create_session(
        &self,
        order_id: &str,
        _lines: &[CartLine],
        _pricing: &PricingBreakdown,
        _return_url: &str,
    ) -> Result<String, GatewayError> {
        Ok(format!("{}/mock-pay?order_id={}", self.base_url, order_id))
    }
}

/// Verify a callback signature header (HMAC-SHA256)
///
/// Header format: `t=<unix-ts>,v1=<hex-hmac>` over `"{t}.{payload}"`.
/// Rejects events older than 5 minutes to prevent replay.
pub fn verify_callback_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signature = "";
    for part in sig_header.split(',') {
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signature = v;
        }
    }

    if timestamp.is_empty() || signature.is_empty() {
        return Err("Invalid signature header");
    }

    let signed_payload = format!("{timestamp}.{}", std::str::from_utf8(payload).unwrap_or(""));
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(signed_payload.as_bytes());

    // Decode hex signature and use constant-time comparison via hmac::verify_slice
    let sig_bytes = hex::decode(signature).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Callback signature mismatch")?;

    // Reject events older than 5 minutes to prevent replay attacks
    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > 300 {
        return Err("Callback timestamp too old");
    }

    Ok(())
}
