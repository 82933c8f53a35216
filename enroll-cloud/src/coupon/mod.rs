//! Coupon engine
//!
//! Validity and per-user eligibility are pure functions of the coupon's
//! stored state. Usage recording happens inside the enrollment transaction,
//! under the coupon's row lock.

use rust_decimal::{Decimal, RoundingStrategy};
use shared::error::{AppError, ErrorCode};
use shared::models::{Coupon, CouponUsage, DiscountQuote};

use crate::db::{Store, StoreResult, StoreTx};

/// Why a coupon cannot be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponRejection {
    NotFound,
    Inactive,
    NotYetValid,
    Expired,
    LimitReached,
    PerUserLimitReached,
}

impl CouponRejection {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotFound => ErrorCode::CouponNotFound,
            Self::Inactive => ErrorCode::CouponInactive,
            Self::NotYetValid => ErrorCode::CouponNotYetValid,
            Self::Expired => ErrorCode::CouponExpired,
            Self::LimitReached => ErrorCode::CouponLimitReached,
            Self::PerUserLimitReached => ErrorCode::CouponUserLimitReached,
        }
    }

    /// User-facing reason
    pub fn reason(&self) -> &'static str {
        self.code().message()
    }
}

impl From<CouponRejection> for AppError {
    fn from(r: CouponRejection) -> Self {
        AppError::new(r.code())
    }
}

/// Temporal and global-usage validity at `now`.
/// The window is inclusive at both ends.
pub fn check_validity(coupon: &Coupon, now: i64) -> Result<(), CouponRejection> {
    if !coupon.is_active {
        return Err(CouponRejection::Inactive);
    }
    if now < coupon.valid_from {
        return Err(CouponRejection::NotYetValid);
    }
    if now > coupon.valid_to {
        return Err(CouponRejection::Expired);
    }
    if let Some(max) = coupon.max_total_uses
        && coupon.current_uses >= max
    {
        return Err(CouponRejection::LimitReached);
    }
    Ok(())
}

pub fn user_usage_count(coupon: &Coupon, user_id: &str) -> usize {
    coupon
        .usage_history
        .iter()
        .filter(|u| u.user_id == user_id)
        .count()
}

pub fn check_user_eligibility(coupon: &Coupon, user_id: &str) -> Result<(), CouponRejection> {
    if user_usage_count(coupon, user_id) as i64 >= i64::from(coupon.max_uses_per_user) {
        return Err(CouponRejection::PerUserLimitReached);
    }
    Ok(())
}

/// `discount = round(original * pct / 100)`, rounded once, half away from zero
pub fn compute_discount(discount_percentage: i32, original_amount: Decimal) -> DiscountQuote {
    let discount_amount = (original_amount * Decimal::from(discount_percentage)
        / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    DiscountQuote {
        original_amount,
        discount_percentage,
        discount_amount,
        final_amount: original_amount - discount_amount,
    }
}

/// A coupon that passed every check for one user and price
#[derive(Debug, Clone)]
pub struct AppliedCoupon {
    pub coupon: Coupon,
    pub quote: DiscountQuote,
}

/// Look the code up and run validity then eligibility against `user_id`.
///
/// Store failures are returned in the outer `Result`; coupon rejections in
/// the inner one so callers can choose to surface or ignore them.
pub async fn resolve(
    store: &dyn Store,
    code: &str,
    user_id: &str,
    price: Decimal,
    now: i64,
) -> StoreResult<Result<AppliedCoupon, CouponRejection>> {
    let normalized = Coupon::normalize_code(code);
    if normalized.is_empty() {
        return Ok(Err(CouponRejection::NotFound));
    }
    let Some(coupon) = store.find_coupon_by_code(&normalized).await? else {
        return Ok(Err(CouponRejection::NotFound));
    };
    if let Err(r) = check_validity(&coupon, now).and_then(|_| check_user_eligibility(&coupon, user_id))
    {
        return Ok(Err(r));
    }
    let quote = compute_discount(coupon.discount_percentage, price);
    Ok(Ok(AppliedCoupon { coupon, quote }))
}

/// Outcome of recording a redemption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageOutcome {
    Recorded,
    /// The case already carries a usage; nothing changed
    AlreadyRecorded,
    /// Limits no longer allow the redemption; nothing changed
    Rejected(CouponRejection),
    /// The coupon row is gone; the already-paid enrollment goes ahead
    /// without a usage entry
    CouponMissing,
}

/// Record one redemption under the coupon's row lock.
///
/// With `enforce_limits`, the global and per-user limits are re-checked
/// against the locked row first. The validity window is not re-checked:
/// the price was fixed when the coupon was resolved. Without it, a coupon
/// deleted since the quote yields [`UsageOutcome::CouponMissing`].
pub async fn record_usage(
    tx: &mut dyn StoreTx,
    usage: &CouponUsage,
    enforce_limits: bool,
) -> StoreResult<UsageOutcome> {
    let Some(coupon) = tx.lock_coupon(&usage.coupon_id).await? else {
        if enforce_limits {
            return Ok(UsageOutcome::Rejected(CouponRejection::NotFound));
        }
        tracing::warn!(
            coupon_id = %usage.coupon_id,
            case_id = %usage.case_id,
            "Coupon removed after quote; enrolling without a usage entry"
        );
        return Ok(UsageOutcome::CouponMissing);
    };
    if coupon.usage_history.iter().any(|u| u.case_id == usage.case_id) {
        return Ok(UsageOutcome::AlreadyRecorded);
    }
    let breach = match coupon.max_total_uses {
        Some(max) if coupon.current_uses >= max => Some(CouponRejection::LimitReached),
        _ => check_user_eligibility(&coupon, &usage.user_id).err(),
    };
    if let Some(reason) = breach {
        if enforce_limits {
            return Ok(UsageOutcome::Rejected(reason));
        }
        tracing::warn!(
            coupon_id = %coupon.id,
            case_id = %usage.case_id,
            reason = reason.reason(),
            "Recording coupon usage past its limit for an already-paid quote"
        );
    }
    if tx.append_coupon_usage(usage).await? {
        Ok(UsageOutcome::Recorded)
    } else {
        Ok(UsageOutcome::AlreadyRecorded)
    }
}
