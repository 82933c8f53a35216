//! Notification records

use shared::models::Notification;
use sqlx::PgExecutor;

pub async fn create<'e>(
    exec: impl PgExecutor<'e>,
    n: &Notification,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO notifications (id, recipient_id, kind, title, message, related_case_id, is_read, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(&n.id)
    .bind(&n.recipient_id)
    .bind(n.kind)
    .bind(&n.title)
    .bind(&n.message)
    .bind(&n.related_case_id)
    .bind(n.is_read)
    .bind(n.created_at)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn list_for_recipient<'e>(
    exec: impl PgExecutor<'e>,
    recipient_id: &str,
    limit: i64,
) -> Result<Vec<Notification>, sqlx::Error> {
    sqlx::query_as::<_, Notification>(
        "SELECT id, recipient_id, kind, title, message, related_case_id, is_read, created_at
         FROM notifications WHERE recipient_id = $1
         ORDER BY created_at DESC LIMIT $2",
    )
    .bind(recipient_id)
    .bind(limit)
    .fetch_all(exec)
    .await
}
