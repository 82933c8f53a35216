//! Pending gateway orders (phase-1 quotes)

use shared::models::PendingOrder;
use sqlx::PgExecutor;

const COLUMNS: &str = "order_id, target_user_id, enroller_id, enroller_role, service_id,
    payment_method, test_mode, coupon_id, coupon_code, original_amount, discount_percentage,
    discount_amount, final_amount, amount_minor, currency, created_at, expires_at";

pub async fn create<'e>(exec: impl PgExecutor<'e>, o: &PendingOrder) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO pending_orders ({COLUMNS})
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)"
    ))
    .bind(&o.order_id)
    .bind(&o.target_user_id)
    .bind(&o.enroller_id)
    .bind(o.enroller_role)
    .bind(&o.service_id)
    .bind(o.payment_method)
    .bind(o.test_mode)
    .bind(&o.coupon_id)
    .bind(&o.coupon_code)
    .bind(o.original_amount)
    .bind(o.discount_percentage)
    .bind(o.discount_amount)
    .bind(o.final_amount)
    .bind(o.amount_minor)
    .bind(&o.currency)
    .bind(o.created_at)
    .bind(o.expires_at)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn find<'e>(
    exec: impl PgExecutor<'e>,
    order_id: &str,
) -> Result<Option<PendingOrder>, sqlx::Error> {
    sqlx::query_as::<_, PendingOrder>(&format!(
        "SELECT {COLUMNS} FROM pending_orders WHERE order_id = $1"
    ))
    .bind(order_id)
    .fetch_optional(exec)
    .await
}

/// Consume an order; concurrent callers race on the row and only one wins
pub async fn take<'e>(
    exec: impl PgExecutor<'e>,
    order_id: &str,
) -> Result<Option<PendingOrder>, sqlx::Error> {
    sqlx::query_as::<_, PendingOrder>(&format!(
        "DELETE FROM pending_orders WHERE order_id = $1 RETURNING {COLUMNS}"
    ))
    .bind(order_id)
    .fetch_optional(exec)
    .await
}

pub async fn delete_expired<'e>(exec: impl PgExecutor<'e>, now: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM pending_orders WHERE expires_at < $1")
        .bind(now)
        .execute(exec)
        .await?;
    Ok(result.rows_affected())
}
