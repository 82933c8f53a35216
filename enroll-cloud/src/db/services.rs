//! Service catalog lookups

use shared::models::Service;
use sqlx::PgExecutor;

pub async fn find_by_id<'e>(
    exec: impl PgExecutor<'e>,
    id: &str,
) -> Result<Option<Service>, sqlx::Error> {
    sqlx::query_as::<_, Service>(
        "SELECT id, name, service_type, price, is_active, sla_hours, documents_required
         FROM services WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(exec)
    .await
}
