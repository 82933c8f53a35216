//! User lookups (read-only for enrollment)

use shared::models::User;
use sqlx::PgExecutor;

pub async fn find_by_id<'e>(
    exec: impl PgExecutor<'e>,
    id: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, name, email, phone, role, source_tag, agent_id, is_active, created_at
         FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(exec)
    .await
}

pub async fn active_admin_ids<'e>(exec: impl PgExecutor<'e>) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> =
        sqlx::query_as("SELECT id FROM users WHERE role = 'admin' AND is_active ORDER BY id")
            .fetch_all(exec)
            .await?;
    Ok(rows.into_iter().map(|r| r.0).collect())
}
