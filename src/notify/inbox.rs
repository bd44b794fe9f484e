//! The recipient-facing side of the notification table.

use axum::{debug_handler, extract::{Path, State}, Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, store, AppResult};

#[debug_handler]
pub async fn list(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    let rows = store::notifications::list_for_user(&db_pool, &user_id).await?;

    let notifications: Vec<Value> = rows
        .into_iter()
        .map(|(id, sender_id, kind, content, link, is_read)| {
            json!({
                "id": id,
                "sender_id": sender_id,
                "type": kind,
                "content": content,
                "link": link,
                "is_read": is_read,
            })
        })
        .collect();
    Ok(Json(json!({ "notifications": notifications })))
}

#[debug_handler]
pub async fn mark_read(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(notification_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    store::notifications::mark_read(&db_pool, &notification_id, &user_id).await?;
    Ok(Json(json!({})))
}
