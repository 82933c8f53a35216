//! Payments and the history read model

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use shared::models::Payment;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use super::{Bucket, HistoryScope, PaymentQuery, PaymentSummary, PaymentView, like_pattern};

pub async fn create<'e>(exec: impl PgExecutor<'e>, p: &Payment) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO payments (id, case_id, user_id, service_id, amount, original_amount,
            discount_amount, discount_percentage, coupon_code, coupon_id, transaction_id,
            gateway_order_id, payment_method, status, cash_payment_details, payment_metadata,
            invoice_number, paid_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
    )
    .bind(&p.id)
    .bind(&p.case_id)
    .bind(&p.user_id)
    .bind(&p.service_id)
    .bind(p.amount)
    .bind(p.original_amount)
    .bind(p.discount_amount)
    .bind(p.discount_percentage)
    .bind(&p.coupon_code)
    .bind(&p.coupon_id)
    .bind(&p.transaction_id)
    .bind(&p.gateway_order_id)
    .bind(p.payment_method)
    .bind(p.status)
    .bind(p.cash_payment_details.as_ref().map(sqlx::types::Json))
    .bind(sqlx::types::Json(&p.payment_metadata))
    .bind(&p.invoice_number)
    .bind(p.paid_at)
    .execute(exec)
    .await?;
    Ok(())
}

/// FROM/JOIN/WHERE shared by the row and aggregate queries
fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, q: &PaymentQuery) {
    qb.push(
        " FROM payments p
         JOIN cases c ON c.id = p.case_id
         JOIN users u ON u.id = p.user_id
         JOIN services s ON s.id = p.service_id
         WHERE TRUE",
    );

    match &q.scope {
        HistoryScope::All => {}
        HistoryScope::AssignedOrEnrolled(id) => {
            qb.push(" AND (c.employee_id = ")
                .push_bind(id.clone())
                .push(" OR c.enrolled_by = ")
                .push_bind(id.clone())
                .push(")");
        }
        HistoryScope::AgentNetwork(id) => {
            qb.push(" AND (u.agent_id = ")
                .push_bind(id.clone())
                .push(" OR c.enrolled_by = ")
                .push_bind(id.clone())
                .push(")");
        }
        HistoryScope::EnrolledBy(id) => {
            qb.push(" AND c.enrolled_by = ").push_bind(id.clone());
        }
        HistoryScope::Own(id) => {
            qb.push(" AND p.user_id = ").push_bind(id.clone());
        }
    }

    if let Some(search) = q.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = like_pattern(search);
        qb.push(" AND (");
        let mut sep = qb.separated(" OR ");
        for column in [
            "p.transaction_id",
            "p.invoice_number",
            "p.coupon_code",
            "c.case_id",
            "u.name",
            "u.email",
            "s.name",
        ] {
            sep.push(format!("{column} ILIKE "))
                .push_bind_unseparated(pattern.clone());
        }
        qb.push(")");
    }
    if let Some(status) = q.status {
        qb.push(" AND p.status = ").push_bind(status);
    }
    if let Some(method) = q.method {
        qb.push(" AND p.payment_method = ").push_bind(method);
    }
    if let Some(from) = q.from {
        qb.push(" AND p.paid_at >= ").push_bind(from);
    }
    if let Some(to) = q.to {
        qb.push(" AND p.paid_at <= ").push_bind(to);
    }
}

pub async fn query<'e>(
    exec: impl PgExecutor<'e>,
    q: &PaymentQuery,
    limit: i64,
    offset: i64,
) -> Result<Vec<PaymentView>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT p.*, c.case_id AS case_number, u.name AS user_name, u.email AS user_email,
            s.name AS service_name",
    );
    push_filters(&mut qb, q);
    qb.push(" ORDER BY p.paid_at DESC, p.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    qb.build_query_as::<PaymentView>().fetch_all(exec).await
}

#[derive(sqlx::FromRow)]
struct TotalsRow {
    count: i64,
    total_amount: Decimal,
    total_original_amount: Decimal,
    total_discount: Decimal,
    discounted_count: i64,
}

#[derive(sqlx::FromRow)]
struct BucketRow {
    key: String,
    count: i64,
    amount: Decimal,
}

async fn buckets(
    pool: &PgPool,
    q: &PaymentQuery,
    column: &str,
) -> Result<BTreeMap<String, Bucket>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {column} AS key, COUNT(*) AS count, COALESCE(SUM(p.amount), 0) AS amount"
    ));
    push_filters(&mut qb, q);
    qb.push(format!(" GROUP BY {column}"));

    let rows = qb.build_query_as::<BucketRow>().fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|r| {
            (
                r.key,
                Bucket {
                    count: r.count as u64,
                    amount: r.amount,
                },
            )
        })
        .collect())
}

/// Totals plus per-method and per-status buckets over the filtered set
pub async fn summarize(pool: &PgPool, q: &PaymentQuery) -> Result<PaymentSummary, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "SELECT COUNT(*) AS count,
            COALESCE(SUM(p.amount), 0) AS total_amount,
            COALESCE(SUM(p.original_amount), 0) AS total_original_amount,
            COALESCE(SUM(p.discount_amount), 0) AS total_discount,
            COUNT(*) FILTER (WHERE p.discount_amount > 0) AS discounted_count",
    );
    push_filters(&mut qb, q);
    let totals = qb.build_query_as::<TotalsRow>().fetch_one(pool).await?;

    Ok(PaymentSummary {
        count: totals.count as u64,
        total_amount: totals.total_amount,
        total_original_amount: totals.total_original_amount,
        total_discount: totals.total_discount,
        discounted_count: totals.discounted_count as u64,
        by_method: buckets(pool, q, "p.payment_method").await?,
        by_status: buckets(pool, q, "p.status").await?,
    })
}
