use axum::{debug_handler, extract::State, Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::AppResult;

const BUCKET_NAME: &str = "images";
const SIZE_LIMIT_BYTES: i64 = 2 * 1024 * 1024;
const ALLOWED_MIME: &str = r#"["image/jpeg","image/png","image/webp","image/gif"]"#;

/// Idempotent image-bucket bootstrap behind `POST /api/storage/init`.
#[debug_handler]
pub async fn init_bucket(State(db_pool): State<SqlitePool>) -> AppResult<Json<Value>> {
    ensure_bucket(&db_pool).await?;
    Ok(Json(json!({ "ok": true })))
}

pub(crate) async fn ensure_bucket(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query("INSERT OR IGNORE INTO buckets (name,size_limit,allowed_mime,created_at) VALUES (?,?,?,?)")
        .bind(BUCKET_NAME)
        .bind(SIZE_LIMIT_BYTES)
        .bind(ALLOWED_MIME)
        .bind(crate::store::now())
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing;

    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let pool = testing::pool().await;
        ensure_bucket(&pool).await.unwrap();
        ensure_bucket(&pool).await.unwrap();

        let (count, size_limit, allowed): (i64, i64, String) = sqlx::query_as(
            "SELECT COUNT(*), MAX(size_limit), MAX(allowed_mime) FROM buckets WHERE name='images'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
        assert_eq!(size_limit, 2 * 1024 * 1024);
        assert!(allowed.contains("image/webp"));
    }
}
