use sqlx::SqlitePool;

use crate::AppResult;

pub async fn insert(pool: &SqlitePool, blocker_id: &str, blocked_id: &str) -> AppResult<()> {
    sqlx::query("INSERT INTO blocks (blocker_id,blocked_id,created_at) VALUES (?,?,?)")
        .bind(blocker_id)
        .bind(blocked_id)
        .bind(super::now())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn delete(pool: &SqlitePool, blocker_id: &str, blocked_id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM blocks WHERE blocker_id=? AND blocked_id=?")
        .bind(blocker_id)
        .bind(blocked_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Blocking is stored asymmetrically but hides both parties from each other,
/// so visibility checks look in both directions.
pub async fn either_direction(pool: &SqlitePool, user_a: &str, user_b: &str) -> AppResult<bool> {
    Ok(sqlx::query_as::<_, (i64,)>(
        "SELECT 1 FROM blocks
         WHERE (blocker_id=? AND blocked_id=?) OR (blocker_id=? AND blocked_id=?)",
    )
    .bind(user_a)
    .bind(user_b)
    .bind(user_b)
    .bind(user_a)
    .fetch_optional(pool)
    .await?
    .is_some())
}
