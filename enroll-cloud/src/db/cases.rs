//! Cases

use shared::models::Case;
use sqlx::PgExecutor;

pub async fn create<'e>(exec: impl PgExecutor<'e>, case: &Case) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO cases (id, case_id, end_user_id, service_id, employee_id, status, current_step,
            deadline, notes, documents, enrolled_by, enrollment_type, enrolled_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(&case.id)
    .bind(&case.case_id)
    .bind(&case.end_user_id)
    .bind(&case.service_id)
    .bind(&case.employee_id)
    .bind(case.status)
    .bind(case.current_step)
    .bind(case.deadline)
    .bind(sqlx::types::Json(&case.notes))
    .bind(sqlx::types::Json(&case.documents))
    .bind(&case.enrolled_by)
    .bind(case.enrollment_type)
    .bind(case.enrolled_at)
    .execute(exec)
    .await?;
    Ok(())
}

pub async fn count<'e>(exec: impl PgExecutor<'e>) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cases")
        .fetch_one(exec)
        .await?;
    Ok(row.0)
}
