use axum::{debug_handler, extract::{Path, State}, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, store, AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}/join", post(join).delete(leave))
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum GroupCategory {
    Strength,
    Physique,
    Powerlifting,
    Fitness,
    Rehab,
    Other,
}

impl GroupCategory {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            GroupCategory::Strength => "strength",
            GroupCategory::Physique => "physique",
            GroupCategory::Powerlifting => "powerlifting",
            GroupCategory::Fitness => "fitness",
            GroupCategory::Rehab => "rehab",
            GroupCategory::Other => "other",
        }
    }
}

#[derive(Deserialize)]
struct NewGroupBody {
    name: String,
    #[serde(default)]
    description: String,
    category: GroupCategory,
    prefecture: Option<String>,
    header_image_url: Option<String>,
}

#[debug_handler]
async fn create(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(body): Json<NewGroupBody>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    let (group_id, chat_room_id) = create_group(&db_pool, &user_id, &body).await?;
    Ok(Json(json!({ "id": group_id, "chat_room_id": chat_room_id })))
}

async fn create_group(
    pool: &SqlitePool,
    creator_id: &str,
    body: &NewGroupBody,
) -> AppResult<(String, String)> {
    // chat room first, so the group row never points at nothing
    let chat_room_id = store::conversations::create(pool).await?;
    let group_id = store::groups::insert(
        pool,
        &body.name,
        &body.description,
        body.category.as_str(),
        body.prefecture.as_deref(),
        body.header_image_url.as_deref(),
        creator_id,
        &chat_room_id,
    )
    .await?;
    store::groups::add_member(pool, &group_id, creator_id).await?;
    store::conversations::add_participant(pool, &chat_room_id, creator_id).await?;
    Ok((group_id, chat_room_id))
}

#[debug_handler]
async fn join(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(group_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    let Some(chat_room_id) = store::groups::chat_room_id(&db_pool, &group_id).await? else {
        return Err(AppError::NotFound("グループが見つかりません".to_owned()));
    };
    store::groups::add_member(&db_pool, &group_id, &user_id).await?;
    store::conversations::add_participant(&db_pool, &chat_room_id, &user_id).await?;
    Ok(Json(json!({})))
}

#[debug_handler]
async fn leave(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(group_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    leave_group(&db_pool, &group_id, &user_id).await?;
    Ok(Json(json!({})))
}

/// Drops both the membership edge and the chat-room participant row, so a
/// departed member stops receiving the room's message fan-out. Idempotent.
async fn leave_group(pool: &SqlitePool, group_id: &str, user_id: &str) -> AppResult<()> {
    store::groups::remove_member(pool, group_id, user_id).await?;
    if let Some(chat_room_id) = store::groups::chat_room_id(pool, group_id).await? {
        store::conversations::remove_participant(pool, &chat_room_id, user_id).await?;
    }
    Ok(())
}
