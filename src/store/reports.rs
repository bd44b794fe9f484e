use sqlx::SqlitePool;
use uuid::Uuid;

use crate::AppResult;

/// Append-only; duplicate reports against the same target are allowed.
pub async fn insert(
    pool: &SqlitePool,
    reporter_id: &str,
    target_id: &str,
    target_type: &str,
    reason: &str,
    details: Option<&str>,
) -> AppResult<String> {
    let id = Uuid::now_v7().to_string();
    sqlx::query(
        "INSERT INTO reports (id,reporter_id,target_id,target_type,reason,details,created_at)
         VALUES (?,?,?,?,?,?,?)",
    )
    .bind(&id)
    .bind(reporter_id)
    .bind(target_id)
    .bind(target_type)
    .bind(reason)
    .bind(details)
    .bind(super::now())
    .execute(pool)
    .await?;
    Ok(id)
}
