use sqlx::SqlitePool;

use crate::AppResult;

/// Inserts the follow edge. A duplicate pair violates the unique constraint
/// and the raw database error is surfaced to the caller, no upsert.
pub async fn insert(pool: &SqlitePool, follower_id: &str, following_id: &str) -> AppResult<()> {
    sqlx::query("INSERT INTO follows (follower_id,following_id,created_at) VALUES (?,?,?)")
        .bind(follower_id)
        .bind(following_id)
        .bind(super::now())
        .execute(pool)
        .await?;
    Ok(())
}

/// Idempotent: deleting a missing edge is not an error.
pub async fn delete(pool: &SqlitePool, follower_id: &str, following_id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM follows WHERE follower_id=? AND following_id=?")
        .bind(follower_id)
        .bind(following_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn exists(pool: &SqlitePool, follower_id: &str, following_id: &str) -> AppResult<bool> {
    Ok(
        sqlx::query_as::<_, (i64,)>("SELECT 1 FROM follows WHERE follower_id=? AND following_id=?")
            .bind(follower_id)
            .bind(following_id)
            .fetch_optional(pool)
            .await?
            .is_some(),
    )
}

/// (follower count, following count) for a profile page.
pub async fn counts(pool: &SqlitePool, user_id: &str) -> AppResult<(i64, i64)> {
    let (followers,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM follows WHERE following_id=?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    let (following,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM follows WHERE follower_id=?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok((followers, following))
}
