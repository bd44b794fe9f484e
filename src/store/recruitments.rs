use sqlx::SqlitePool;
use uuid::Uuid;

use crate::AppResult;

pub struct NewRecruitment<'a> {
    pub owner_id: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub body_part: Option<&'a str>,
    pub event_at: Option<i64>,
    pub location: Option<&'a str>,
    pub level: Option<&'a str>,
    pub chat_room_id: &'a str,
}

pub async fn insert(pool: &SqlitePool, new: &NewRecruitment<'_>) -> AppResult<String> {
    let id = Uuid::now_v7().to_string();
    sqlx::query(
        "INSERT INTO recruitments (id,owner_id,title,description,body_part,event_at,location,level,status,chat_room_id,created_at)
         VALUES (?,?,?,?,?,?,?,?,'open',?,?)",
    )
    .bind(&id)
    .bind(new.owner_id)
    .bind(new.title)
    .bind(new.description)
    .bind(new.body_part)
    .bind(new.event_at)
    .bind(new.location)
    .bind(new.level)
    .bind(new.chat_room_id)
    .bind(super::now())
    .execute(pool)
    .await?;
    Ok(id)
}

/// (owner_id, title, status, chat_room_id).
pub type RecruitmentRow = (String, String, String, String);

pub async fn get(pool: &SqlitePool, id: &str) -> AppResult<Option<RecruitmentRow>> {
    Ok(sqlx::query_as::<_, RecruitmentRow>(
        "SELECT owner_id,title,status,chat_room_id FROM recruitments WHERE id=?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?)
}

pub async fn is_chat_room(pool: &SqlitePool, conversation_id: &str) -> AppResult<bool> {
    Ok(
        sqlx::query_as::<_, (i64,)>("SELECT 1 FROM recruitments WHERE chat_room_id=?")
            .bind(conversation_id)
            .fetch_optional(pool)
            .await?
            .is_some(),
    )
}

pub async fn delete(pool: &SqlitePool, id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM recruitments WHERE id=?")
        .bind(id)
        .execute(pool)
        .await?;
    sqlx::query("DELETE FROM recruitment_participants WHERE recruitment_id=?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn add_participant(pool: &SqlitePool, recruitment_id: &str, user_id: &str) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO recruitment_participants (recruitment_id,user_id,status,created_at)
         VALUES (?,?,'pending',?)",
    )
    .bind(recruitment_id)
    .bind(user_id)
    .bind(super::now())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn participant_status(
    pool: &SqlitePool,
    recruitment_id: &str,
    user_id: &str,
) -> AppResult<Option<String>> {
    Ok(sqlx::query_as::<_, (String,)>(
        "SELECT status FROM recruitment_participants WHERE recruitment_id=? AND user_id=?",
    )
    .bind(recruitment_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .map(|(status,)| status))
}

pub async fn set_participant_status(
    pool: &SqlitePool,
    recruitment_id: &str,
    user_id: &str,
    status: &str,
) -> AppResult<()> {
    sqlx::query(
        "UPDATE recruitment_participants SET status=? WHERE recruitment_id=? AND user_id=?",
    )
    .bind(status)
    .bind(recruitment_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Participants still attached to the recruitment: pending or approved.
pub async fn active_participants(pool: &SqlitePool, recruitment_id: &str) -> AppResult<Vec<String>> {
    Ok(sqlx::query_as::<_, (String,)>(
        "SELECT user_id FROM recruitment_participants
         WHERE recruitment_id=? AND status IN ('pending','approved')",
    )
    .bind(recruitment_id)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(user_id,)| user_id)
    .collect())
}
