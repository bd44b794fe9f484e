use axum::{debug_handler, extract::{Path, State}, Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, store, AppError, AppResult};

#[debug_handler]
pub(crate) async fn block(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(target_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    block_user(&db_pool, &user_id, &target_id).await?;
    Ok(Json(json!({})))
}

#[debug_handler]
pub(crate) async fn unblock(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(target_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    store::blocks::delete(&db_pool, &user_id, &target_id).await?;
    Ok(Json(json!({})))
}

pub(crate) async fn block_user(pool: &SqlitePool, user_id: &str, target_id: &str) -> AppResult<()> {
    if user_id == target_id {
        return Err(AppError::InvalidArgument("自分をブロックすることはできません".to_owned()));
    }
    store::blocks::insert(pool, user_id, target_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing;

    #[tokio::test]
    async fn self_block_is_rejected_with_no_write() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", None, None).await;

        let err = block_user(&pool, "a", "a").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(!store::blocks::either_direction(&pool, "a", "a").await.unwrap());
    }

    #[tokio::test]
    async fn block_hides_both_directions() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", None, None).await;
        testing::seed_user(&pool, "b", "花子", None, None).await;

        block_user(&pool, "a", "b").await.unwrap();
        assert!(store::blocks::either_direction(&pool, "a", "b").await.unwrap());
        assert!(store::blocks::either_direction(&pool, "b", "a").await.unwrap());

        store::blocks::delete(&pool, "a", "b").await.unwrap();
        assert!(!store::blocks::either_direction(&pool, "b", "a").await.unwrap());
        // unblock again: idempotent
        store::blocks::delete(&pool, "a", "b").await.unwrap();
    }
}
