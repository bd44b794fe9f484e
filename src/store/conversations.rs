use sqlx::SqlitePool;
use uuid::Uuid;

use crate::AppResult;

pub async fn create(pool: &SqlitePool) -> AppResult<String> {
    let id = Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO conversations (id,created_at) VALUES (?,?)")
        .bind(&id)
        .bind(super::now())
        .execute(pool)
        .await?;
    Ok(id)
}

pub async fn add_participant(pool: &SqlitePool, conversation_id: &str, user_id: &str) -> AppResult<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO conversation_participants (conversation_id,user_id) VALUES (?,?)",
    )
    .bind(conversation_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn remove_participant(
    pool: &SqlitePool,
    conversation_id: &str,
    user_id: &str,
) -> AppResult<()> {
    sqlx::query("DELETE FROM conversation_participants WHERE conversation_id=? AND user_id=?")
        .bind(conversation_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn ids_for_user(pool: &SqlitePool, user_id: &str) -> AppResult<Vec<String>> {
    Ok(sqlx::query_as::<_, (String,)>(
        "SELECT conversation_id FROM conversation_participants WHERE user_id=?",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(id,)| id)
    .collect())
}

pub async fn is_participant(pool: &SqlitePool, conversation_id: &str, user_id: &str) -> AppResult<bool> {
    Ok(sqlx::query_as::<_, (i64,)>(
        "SELECT 1 FROM conversation_participants WHERE conversation_id=? AND user_id=?",
    )
    .bind(conversation_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .is_some())
}

pub async fn participants(pool: &SqlitePool, conversation_id: &str) -> AppResult<Vec<String>> {
    Ok(sqlx::query_as::<_, (String,)>(
        "SELECT user_id FROM conversation_participants WHERE conversation_id=?",
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(user_id,)| user_id)
    .collect())
}

pub async fn insert_message(
    pool: &SqlitePool,
    conversation_id: &str,
    sender_id: &str,
    content: &str,
) -> AppResult<String> {
    let id = Uuid::now_v7().to_string();
    sqlx::query("INSERT INTO messages (id,conversation_id,sender_id,content,created_at) VALUES (?,?,?,?,?)")
        .bind(&id)
        .bind(conversation_id)
        .bind(sender_id)
        .bind(content)
        .bind(super::now())
        .execute(pool)
        .await?;
    Ok(id)
}

/// Advances the caller's read watermark to now.
pub async fn mark_read(pool: &SqlitePool, conversation_id: &str, user_id: &str) -> AppResult<()> {
    sqlx::query(
        "UPDATE conversation_participants SET last_read_at=? WHERE conversation_id=? AND user_id=?",
    )
    .bind(super::now())
    .bind(conversation_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Messages from other senders newer than the caller's watermark.
pub async fn unread_count(pool: &SqlitePool, conversation_id: &str, user_id: &str) -> AppResult<i64> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM messages
         WHERE conversation_id=? AND sender_id != ?
           AND created_at > COALESCE(
               (SELECT last_read_at FROM conversation_participants
                WHERE conversation_id=? AND user_id=?), 0)",
    )
    .bind(conversation_id)
    .bind(user_id)
    .bind(conversation_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}
