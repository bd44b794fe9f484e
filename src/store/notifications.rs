use sqlx::SqlitePool;
use uuid::Uuid;

use crate::AppResult;

/// In-app notification row. Only server-side fan-out writes these.
pub async fn insert(
    pool: &SqlitePool,
    user_id: &str,
    sender_id: &str,
    kind: &str,
    content: &str,
    link: Option<&str>,
) -> AppResult<String> {
    let id = Uuid::now_v7().to_string();
    sqlx::query(
        "INSERT INTO notifications (id,user_id,sender_id,type,content,link,created_at)
         VALUES (?,?,?,?,?,?,?)",
    )
    .bind(&id)
    .bind(user_id)
    .bind(sender_id)
    .bind(kind)
    .bind(content)
    .bind(link)
    .bind(super::now())
    .execute(pool)
    .await?;
    Ok(id)
}

/// (id, sender_id, type, content, link, is_read), newest first.
pub type NotificationRow = (String, String, String, String, Option<String>, bool);

pub async fn list_for_user(pool: &SqlitePool, user_id: &str) -> AppResult<Vec<NotificationRow>> {
    Ok(sqlx::query_as::<_, NotificationRow>(
        "SELECT id,sender_id,type,content,link,is_read FROM notifications
         WHERE user_id=? ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Recipient-only mutation; marking someone else's notification is a no-op.
pub async fn mark_read(pool: &SqlitePool, id: &str, user_id: &str) -> AppResult<()> {
    sqlx::query("UPDATE notifications SET is_read=1 WHERE id=? AND user_id=?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
