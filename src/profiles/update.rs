use axum::{debug_handler, extract::State, Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, store, AppError, AppResult};

#[debug_handler]
pub(crate) async fn update_me(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(update): Json<store::profiles::ProfileUpdate>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    if update.nickname.trim().is_empty() {
        return Err(AppError::InvalidArgument("ニックネームを入力してください".to_owned()));
    }
    store::profiles::update(&db_pool, &user_id, &update).await?;
    Ok(Json(json!({})))
}
