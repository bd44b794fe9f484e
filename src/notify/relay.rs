//! Thin HTTP adapters over the fan-out, one per trigger event. Unlike the
//! actions that call the notifier best-effort, these surface delivery
//! failures to the caller directly.

use axum::{debug_handler, extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::{AppResult, AppState, Notifier};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow", post(follow))
        .route("/message", post(message))
        .route("/application", post(application))
}

#[derive(Deserialize)]
pub(crate) struct FollowRelay {
    following_id: String,
    follower_id: String,
}

#[debug_handler(state = AppState)]
async fn follow(
    State(db_pool): State<SqlitePool>,
    State(notifier): State<Notifier>,
    Json(FollowRelay { following_id, follower_id }): Json<FollowRelay>,
) -> AppResult<Json<Value>> {
    notifier.notify_follow(&db_pool, &following_id, &follower_id).await?;
    Ok(Json(json!({ "ok": true })))
}

#[derive(Deserialize)]
pub(crate) struct MessageRelay {
    recipient_user_id: String,
    sender_nickname: Option<String>,
    #[serde(default)]
    is_group: bool,
    group_name: Option<String>,
}

#[debug_handler(state = AppState)]
async fn message(
    State(db_pool): State<SqlitePool>,
    State(notifier): State<Notifier>,
    Json(relay): Json<MessageRelay>,
) -> AppResult<Json<Value>> {
    notifier
        .notify_message(
            &db_pool,
            &relay.recipient_user_id,
            relay.sender_nickname.as_deref(),
            relay.is_group,
            relay.group_name.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "ok": true })))
}

#[derive(Deserialize)]
pub(crate) struct ApplicationRelay {
    creator_id: String,
    recruitment_title: Option<String>,
    applicant_nickname: Option<String>,
}

#[debug_handler(state = AppState)]
async fn application(
    State(db_pool): State<SqlitePool>,
    State(notifier): State<Notifier>,
    Json(relay): Json<ApplicationRelay>,
) -> AppResult<Json<Value>> {
    notifier
        .notify_application(
            &db_pool,
            &relay.creator_id,
            relay.recruitment_title.as_deref(),
            relay.applicant_nickname.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "ok": true })))
}
