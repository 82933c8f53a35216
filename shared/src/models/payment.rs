//! Payment Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::user::Role;

/// Payment channel
///
/// `Online`, `Card` and `Upi` only appear on historical rows; enrollment
/// writes `Razorpay`, `Cash` or `TestPayment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum PaymentMethod {
    Razorpay,
    Cash,
    TestPayment,
    Online,
    Card,
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Razorpay => "razorpay",
            Self::Cash => "cash",
            Self::TestPayment => "test_payment",
            Self::Online => "online",
            Self::Card => "card",
            Self::Upi => "upi",
        }
    }

    /// Channels accepted by the enrollment write path
    pub fn is_enrollment_channel(&self) -> bool {
        matches!(self, Self::Razorpay | Self::Cash | Self::TestPayment)
    }

    /// Two-phase channels (quote, then verify-and-commit)
    pub fn is_gateway(&self) -> bool {
        matches!(self, Self::Razorpay | Self::TestPayment)
    }
}

/// Settlement status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

/// Manually attested cash receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashPaymentDetails {
    pub receipt_number: Option<String>,
    pub notes: String,
    pub received_by: String,
    pub received_at: i64,
}

/// Audit trail of who initiated the payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMetadata {
    pub enrolled_by: String,
    pub enroller_role: Role,
    pub payment_initiated_from: String,
}

/// Settlement record, 1:1 with the case it created
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: String,
    /// References `Case::id`
    pub case_id: String,
    pub user_id: String,
    pub service_id: String,
    /// Final, post-discount
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub original_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    pub discount_percentage: i32,
    pub coupon_code: Option<String>,
    pub coupon_id: Option<String>,
    pub transaction_id: String,
    pub gateway_order_id: Option<String>,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    #[cfg_attr(feature = "db", sqlx(json(nullable)))]
    pub cash_payment_details: Option<CashPaymentDetails>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub payment_metadata: PaymentMetadata,
    pub invoice_number: String,
    pub paid_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_channels() {
        assert!(PaymentMethod::Cash.is_enrollment_channel());
        assert!(!PaymentMethod::Cash.is_gateway());
        assert!(PaymentMethod::Razorpay.is_gateway());
        assert!(PaymentMethod::TestPayment.is_gateway());
        assert!(!PaymentMethod::Upi.is_enrollment_channel());
    }

    #[test]
    fn test_legacy_method_deserializes() {
        let m: PaymentMethod = serde_json::from_str("\"online\"").unwrap();
        assert_eq!(m, PaymentMethod::Online);
        let m: PaymentMethod = serde_json::from_str("\"test_payment\"").unwrap();
        assert_eq!(m, PaymentMethod::TestPayment);
        assert_eq!(m.as_str(), "test_payment");
    }
}
