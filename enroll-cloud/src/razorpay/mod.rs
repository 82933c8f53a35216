//! Razorpay integration via REST API (no SDK dependency)
//!
//! Test mode never touches the network: orders are synthesized locally and
//! every payment verifies.

use std::time::Duration;

use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::ids;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request timed out")]
    Timeout,
    #[error("gateway request failed: {0}")]
    Request(reqwest::Error),
    #[error("gateway rejected order: {0}")]
    Rejected(String),
    #[error("amount {0} cannot be expressed in minor units")]
    InvalidAmount(Decimal),
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else {
            GatewayError::Request(e)
        }
    }
}

/// Gateway-side payment intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayOrder {
    pub id: String,
    /// Minor units (paise)
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub receipt: Option<String>,
}

/// Fields the checkout widget hands back after a successful payment
#[derive(Debug, Clone)]
pub struct PaymentProof {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
    status: String,
    receipt: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RazorpayGateway {
    client: reqwest::Client,
    key_id: String,
    key_secret: String,
    api_base: String,
    currency: String,
}

/// Whole-unit amount to minor units (×100)
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED).round().to_i64()
}

/// Hex HMAC-SHA256 over `orderId|paymentId`, as the checkout widget signs it
#[cfg(test)]
pub(crate) fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("hmac key");
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

impl RazorpayGateway {
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        api_base: impl Into<String>,
        currency: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GatewayError::Request)?;
        Ok(Self {
            client,
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            currency: currency.into(),
        })
    }

    /// Create an order for `amount` (whole currency units)
    pub async fn create_order(
        &self,
        amount: Decimal,
        receipt: &str,
        test_mode: bool,
    ) -> Result<GatewayOrder, GatewayError> {
        let minor = to_minor_units(amount).ok_or(GatewayError::InvalidAmount(amount))?;

        if test_mode {
            let now = shared::util::now_millis();
            return Ok(GatewayOrder {
                id: format!("order_test_{now}_{}", ids::random_suffix(6).to_ascii_lowercase()),
                amount: minor,
                currency: self.currency.clone(),
                status: "created".to_string(),
                receipt: Some(receipt.to_string()),
            });
        }

        let resp = self
            .client
            .post(format!("{}/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&serde_json::json!({
                "amount": minor,
                "currency": self.currency,
                "receipt": receipt,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body: serde_json::Value = resp.json().await.unwrap_or_default();
            let description = body["error"]["description"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(GatewayError::Rejected(description));
        }

        let order: OrderResponse = resp.json().await?;
        tracing::info!(order_id = %order.id, amount = order.amount, "Razorpay order created");
        Ok(GatewayOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
            status: order.status,
            receipt: order.receipt,
        })
    }

    /// Check the checkout signature; test mode always passes
    pub fn verify_payment(&self, proof: &PaymentProof, test_mode: bool) -> bool {
        if test_mode {
            return true;
        }
        let Ok(sig_bytes) = hex::decode(proof.signature.trim()) else {
            return false;
        };
        let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(self.key_secret.as_bytes()) else {
            return false;
        };
        mac.update(format!("{}|{}", proof.order_id, proof.payment_id).as_bytes());
        // constant-time comparison
        mac.verify_slice(&sig_bytes).is_ok()
    }
}
