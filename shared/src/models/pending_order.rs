//! Pending gateway order (server-side quote)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::coupon::DiscountQuote;
use super::payment::PaymentMethod;
use super::user::Role;

/// Quote created by phase 1 of a gateway enrollment, consumed by phase 2
///
/// Keyed by the gateway order id. Phase 2 trusts only this record, never
/// client-echoed identities or prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PendingOrder {
    pub order_id: String,
    pub target_user_id: String,
    pub enroller_id: String,
    pub enroller_role: Role,
    pub service_id: String,
    pub payment_method: PaymentMethod,
    pub test_mode: bool,
    pub coupon_id: Option<String>,
    pub coupon_code: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub original_amount: Decimal,
    pub discount_percentage: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub final_amount: Decimal,
    pub amount_minor: i64,
    pub currency: String,
    pub created_at: i64,
    pub expires_at: i64,
}

impl PendingOrder {
    pub fn quote(&self) -> DiscountQuote {
        DiscountQuote {
            original_amount: self.original_amount,
            discount_percentage: self.discount_percentage,
            discount_amount: self.discount_amount,
            final_amount: self.final_amount,
        }
    }

    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }
}
