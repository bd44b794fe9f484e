use axum::{debug_handler, extract::{Path, State}, Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::warn;

use crate::{notify::Fanout, session, store, AppError, AppResult, AppState, Notifier};

#[debug_handler(state = AppState)]
pub(crate) async fn follow(
    State(db_pool): State<SqlitePool>,
    State(notifier): State<Notifier>,
    session: Session,
    Path(target_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    follow_user(&db_pool, &notifier, &user_id, &target_id).await?;
    Ok(Json(json!({})))
}

#[debug_handler(state = AppState)]
pub(crate) async fn unfollow(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(target_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    store::follows::delete(&db_pool, &user_id, &target_id).await?;
    Ok(Json(json!({})))
}

/// Inserts the edge, then fires the fan-out best-effort: a notification
/// failure never rolls back the follow itself.
pub(crate) async fn follow_user(
    pool: &SqlitePool,
    notifier: &Notifier,
    user_id: &str,
    target_id: &str,
) -> AppResult<()> {
    if user_id == target_id {
        return Err(AppError::InvalidArgument("自分をフォローすることはできません".to_owned()));
    }

    store::follows::insert(pool, user_id, target_id).await?;

    if let Err(e) = fanout_follow(pool, notifier, user_id, target_id).await {
        warn!("follow notification for {target_id} failed: {e}");
    }
    Ok(())
}

/// In-app row plus the email/LINE relay, both secondary to the edge insert.
pub(crate) async fn fanout_follow(
    pool: &SqlitePool,
    notifier: &Notifier,
    follower_id: &str,
    following_id: &str,
) -> AppResult<Fanout> {
    let follower = store::profiles::nickname(pool, follower_id)
        .await?
        .unwrap_or_else(|| "名無しトレーニー".to_owned());
    store::notifications::insert(
        pool,
        following_id,
        follower_id,
        "follow",
        &format!("{follower}さんにフォローされました"),
        Some(&format!("/p/{follower_id}")),
    )
    .await?;
    notifier.notify_follow(pool, following_id, follower_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing;
    use crate::Config;

    fn notifier() -> Notifier {
        Notifier::new(Config::for_tests())
    }

    #[tokio::test]
    async fn self_follow_is_rejected_with_no_write() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", Some("taro@example.com"), None).await;

        let err = follow_user(&pool, &notifier(), "a", "a").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(!store::follows::exists(&pool, "a", "a").await.unwrap());
    }

    #[tokio::test]
    async fn follow_writes_edge_and_notification_row() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", Some("taro@example.com"), None).await;
        testing::seed_user(&pool, "b", "花子", Some("hanako@example.com"), Some("L1")).await;

        follow_user(&pool, &notifier(), "a", "b").await.unwrap();

        assert!(store::follows::exists(&pool, "a", "b").await.unwrap());
        let rows = store::notifications::list_for_user(&pool, "b").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, "a");
        assert_eq!(rows[0].2, "follow");
        assert!(rows[0].3.contains("太郎"));
    }

    #[tokio::test]
    async fn duplicate_follow_surfaces_the_raw_database_error() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", Some("taro@example.com"), None).await;
        testing::seed_user(&pool, "b", "花子", Some("hanako@example.com"), None).await;

        follow_user(&pool, &notifier(), "a", "b").await.unwrap();
        let err = follow_user(&pool, &notifier(), "a", "b").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn notification_failure_does_not_roll_back_the_edge() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", Some("taro@example.com"), None).await;
        // target has no email, so the fan-out fails hard inside the relay
        testing::seed_user(&pool, "b", "花子", None, None).await;

        follow_user(&pool, &notifier(), "a", "b").await.unwrap();
        assert!(store::follows::exists(&pool, "a", "b").await.unwrap());
        // the in-app row still landed before the relay step failed
        let rows = store::notifications::list_for_user(&pool, "b").await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn unfollow_is_idempotent() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "a", "太郎", Some("taro@example.com"), None).await;
        testing::seed_user(&pool, "b", "花子", Some("hanako@example.com"), None).await;

        // never followed, still fine
        store::follows::delete(&pool, "a", "b").await.unwrap();

        follow_user(&pool, &notifier(), "a", "b").await.unwrap();
        store::follows::delete(&pool, "a", "b").await.unwrap();
        store::follows::delete(&pool, "a", "b").await.unwrap();
        assert!(!store::follows::exists(&pool, "a", "b").await.unwrap());
    }
}
