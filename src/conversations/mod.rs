pub(crate) mod msg;
pub mod resolver;

use axum::{debug_handler, extract::{Path, State}, routing::{get, post}, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, store, AppResult, AppState, Notifier};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/with/{user_id}", post(open_direct))
        .route("/{id}/messages", post(send_message))
        .route("/{id}/read", post(mark_read))
        .route("/{id}/unread", get(unread))
}

#[debug_handler]
async fn open_direct(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(other_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    let conversation_id = resolver::get_or_create_conversation(&db_pool, &user_id, &other_id).await?;
    Ok(Json(json!({ "conversation_id": conversation_id })))
}

#[derive(Deserialize)]
struct SendMessageBody {
    content: String,
}

#[debug_handler(state = AppState)]
async fn send_message(
    State(db_pool): State<SqlitePool>,
    State(notifier): State<Notifier>,
    session: Session,
    Path(conversation_id): Path<String>,
    Json(SendMessageBody { content }): Json<SendMessageBody>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    let message_id =
        msg::send_message(&db_pool, &notifier, &conversation_id, &user_id, &content).await?;
    Ok(Json(json!({ "message_id": message_id })))
}

#[debug_handler]
async fn mark_read(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    store::conversations::mark_read(&db_pool, &conversation_id, &user_id).await?;
    Ok(Json(json!({})))
}

#[debug_handler]
async fn unread(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(conversation_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    let count = store::conversations::unread_count(&db_pool, &conversation_id, &user_id).await?;
    Ok(Json(json!({ "unread": count })))
}
