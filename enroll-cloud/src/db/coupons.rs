//! Coupons and their redemption ledger

use shared::models::{Coupon, CouponUsage};
use sqlx::{PgConnection, PgExecutor};

const COUPON_COLUMNS: &str = "id, code, description, discount_percentage, valid_from, valid_to,
    max_total_uses, max_uses_per_user, current_uses, is_active, created_at";

pub async fn find_by_code<'e>(
    exec: impl PgExecutor<'e>,
    code: &str,
) -> Result<Option<Coupon>, sqlx::Error> {
    sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = $1"
    ))
    .bind(code)
    .fetch_optional(exec)
    .await
}

/// Row-locks the coupon for the rest of the transaction
pub async fn lock_by_id(
    conn: &mut PgConnection,
    id: &str,
) -> Result<Option<Coupon>, sqlx::Error> {
    sqlx::query_as::<_, Coupon>(&format!(
        "SELECT {COUPON_COLUMNS} FROM coupons WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn usages<'e>(
    exec: impl PgExecutor<'e>,
    coupon_id: &str,
) -> Result<Vec<CouponUsage>, sqlx::Error> {
    sqlx::query_as::<_, CouponUsage>(
        "SELECT coupon_id, user_id, case_id, payment_id, discount_amount, used_at
         FROM coupon_usages WHERE coupon_id = $1 ORDER BY used_at",
    )
    .bind(coupon_id)
    .fetch_all(exec)
    .await
}

/// Insert the usage and bump `current_uses` in the same transaction.
/// A second usage for the same case is ignored.
pub async fn append_usage(
    conn: &mut PgConnection,
    usage: &CouponUsage,
) -> Result<bool, sqlx::Error> {
    let inserted = sqlx::query(
        "INSERT INTO coupon_usages (coupon_id, user_id, case_id, payment_id, discount_amount, used_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (case_id) DO NOTHING",
    )
    .bind(&usage.coupon_id)
    .bind(&usage.user_id)
    .bind(&usage.case_id)
    .bind(&usage.payment_id)
    .bind(usage.discount_amount)
    .bind(usage.used_at)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if inserted == 0 {
        return Ok(false);
    }

    sqlx::query("UPDATE coupons SET current_uses = current_uses + 1 WHERE id = $1")
        .bind(&usage.coupon_id)
        .execute(&mut *conn)
        .await?;
    Ok(true)
}
