use sqlx::SqlitePool;
use uuid::Uuid;

use crate::AppResult;

pub async fn insert(
    pool: &SqlitePool,
    name: &str,
    description: &str,
    category: &str,
    prefecture: Option<&str>,
    header_image_url: Option<&str>,
    creator_id: &str,
    chat_room_id: &str,
) -> AppResult<String> {
    let id = Uuid::now_v7().to_string();
    sqlx::query(
        "INSERT INTO groups (id,name,description,category,prefecture,header_image_url,creator_id,chat_room_id,created_at)
         VALUES (?,?,?,?,?,?,?,?,?)",
    )
    .bind(&id)
    .bind(name)
    .bind(description)
    .bind(category)
    .bind(prefecture)
    .bind(header_image_url)
    .bind(creator_id)
    .bind(chat_room_id)
    .bind(super::now())
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn chat_room_id(pool: &SqlitePool, group_id: &str) -> AppResult<Option<String>> {
    Ok(
        sqlx::query_as::<_, (String,)>("SELECT chat_room_id FROM groups WHERE id=?")
            .bind(group_id)
            .fetch_optional(pool)
            .await?
            .map(|(id,)| id),
    )
}

/// Group name for a conversation bound to a group, if any. Also serves as
/// the "is this a group chat room" check.
pub async fn name_by_chat_room(pool: &SqlitePool, conversation_id: &str) -> AppResult<Option<String>> {
    Ok(
        sqlx::query_as::<_, (String,)>("SELECT name FROM groups WHERE chat_room_id=?")
            .bind(conversation_id)
            .fetch_optional(pool)
            .await?
            .map(|(name,)| name),
    )
}

/// Duplicate membership violates the unique pair constraint; the raw error
/// is surfaced.
pub async fn add_member(pool: &SqlitePool, group_id: &str, user_id: &str) -> AppResult<()> {
    sqlx::query("INSERT INTO group_members (group_id,user_id,created_at) VALUES (?,?,?)")
        .bind(group_id)
        .bind(user_id)
        .bind(super::now())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn remove_member(pool: &SqlitePool, group_id: &str, user_id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM group_members WHERE group_id=? AND user_id=?")
        .bind(group_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(())
}
