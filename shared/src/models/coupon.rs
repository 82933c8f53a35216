//! Coupon Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Discount instrument
///
/// `current_uses` always equals `usage_history.len()` after a committed
/// enrollment; both are only ever changed together by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Coupon {
    pub id: String,
    /// Stored uppercase
    pub code: String,
    pub description: Option<String>,
    /// 1..=100
    pub discount_percentage: i32,
    pub valid_from: i64,
    pub valid_to: i64,
    /// `None` = unlimited
    pub max_total_uses: Option<i32>,
    pub max_uses_per_user: i32,
    pub current_uses: i32,
    pub is_active: bool,
    pub created_at: i64,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub usage_history: Vec<CouponUsage>,
}

impl Coupon {
    /// Normalize a user-supplied code to its stored form
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Remaining global uses, `None` when unlimited
    pub fn remaining_uses(&self) -> Option<i32> {
        self.max_total_uses
            .map(|max| (max - self.current_uses).max(0))
    }
}

/// One redemption in a coupon's append-only usage ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CouponUsage {
    pub coupon_id: String,
    pub user_id: String,
    /// References `Case::id`
    pub case_id: String,
    pub payment_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    pub used_at: i64,
}

/// Price breakdown for a (possibly discounted) purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountQuote {
    #[serde(with = "rust_decimal::serde::float")]
    pub original_amount: Decimal,
    pub discount_percentage: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub final_amount: Decimal,
}

impl DiscountQuote {
    /// Undiscounted quote
    pub fn full_price(amount: Decimal) -> Self {
        Self {
            original_amount: amount,
            discount_percentage: 0,
            discount_amount: Decimal::ZERO,
            final_amount: amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_code() {
        assert_eq!(Coupon::normalize_code("  save20 "), "SAVE20");
        assert_eq!(Coupon::normalize_code("Save20"), "SAVE20");
    }

    #[test]
    fn test_full_price_quote() {
        let quote = DiscountQuote::full_price(Decimal::from(5000));
        assert_eq!(quote.final_amount, Decimal::from(5000));
        assert_eq!(quote.discount_amount, Decimal::ZERO);
        assert_eq!(quote.discount_percentage, 0);
    }

    #[test]
    fn test_quote_serializes_amounts_as_numbers() {
        let quote = DiscountQuote {
            original_amount: Decimal::from(1000),
            discount_percentage: 20,
            discount_amount: Decimal::from(200),
            final_amount: Decimal::from(800),
        };
        let json = serde_json::to_value(quote).unwrap();
        assert_eq!(json["discountAmount"], 200.0);
        assert_eq!(json["finalAmount"], 800.0);
        assert_eq!(json["discountPercentage"], 20);
    }
}
