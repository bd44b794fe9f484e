mod participation;

use axum::{debug_handler, extract::{Path, State}, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::warn;

use participation::ParticipationStatus;

use crate::{session, store, AppError, AppResult, AppState, Notifier};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", axum::routing::delete(close))
        .route("/{id}/apply", post(apply))
        .route("/{id}/withdraw", post(withdraw))
        .route("/{id}/participants/{user_id}/approve", post(approve))
        .route("/{id}/participants/{user_id}/reject", post(reject))
}

#[derive(Deserialize)]
struct NewRecruitmentBody {
    title: String,
    #[serde(default)]
    description: String,
    body_part: Option<String>,
    event_at: Option<i64>,
    location: Option<String>,
    level: Option<String>,
}

#[debug_handler]
async fn create(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(body): Json<NewRecruitmentBody>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;

    // the bound chat room exists before the recruitment row references it
    let chat_room_id = store::conversations::create(&db_pool).await?;
    store::conversations::add_participant(&db_pool, &chat_room_id, &user_id).await?;

    let id = store::recruitments::insert(
        &db_pool,
        &store::recruitments::NewRecruitment {
            owner_id: &user_id,
            title: &body.title,
            description: &body.description,
            body_part: body.body_part.as_deref(),
            event_at: body.event_at,
            location: body.location.as_deref(),
            level: body.level.as_deref(),
            chat_room_id: &chat_room_id,
        },
    )
    .await?;
    Ok(Json(json!({ "id": id, "chat_room_id": chat_room_id })))
}

#[debug_handler(state = AppState)]
async fn apply(
    State(db_pool): State<SqlitePool>,
    State(notifier): State<Notifier>,
    session: Session,
    Path(recruitment_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    participation::apply(&db_pool, &notifier, &recruitment_id, &user_id).await?;
    Ok(Json(json!({})))
}

#[debug_handler]
async fn withdraw(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(recruitment_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    participation::transition(&db_pool, &recruitment_id, &user_id, ParticipationStatus::Withdrawn)
        .await?;
    Ok(Json(json!({})))
}

#[debug_handler]
async fn approve(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path((recruitment_id, applicant_id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    let chat_room_id = owned_recruitment(&db_pool, &recruitment_id, &user_id).await?;
    participation::approve(&db_pool, &recruitment_id, &chat_room_id, &applicant_id).await?;
    Ok(Json(json!({})))
}

#[debug_handler]
async fn reject(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path((recruitment_id, applicant_id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    owned_recruitment(&db_pool, &recruitment_id, &user_id).await?;
    participation::transition(&db_pool, &recruitment_id, &applicant_id, ParticipationStatus::Rejected)
        .await?;
    Ok(Json(json!({})))
}

#[debug_handler]
async fn close(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(recruitment_id): Path<String>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    owned_recruitment(&db_pool, &recruitment_id, &user_id).await?;
    close_recruitment(&db_pool, &recruitment_id).await?;
    Ok(Json(json!({})))
}

/// The recruitment's chat room id, or NotFound when missing or not owned by
/// the caller (non-owners learn nothing).
async fn owned_recruitment(
    pool: &SqlitePool,
    recruitment_id: &str,
    user_id: &str,
) -> AppResult<String> {
    match store::recruitments::get(pool, recruitment_id).await? {
        Some((owner_id, _title, _status, chat_room_id)) if owner_id == user_id => Ok(chat_room_id),
        _ => Err(AppError::NotFound("募集が見つかりません".to_owned())),
    }
}

/// Notifies every pending/approved participant, then deletes. The cascade is
/// best-effort per participant and the deletion happens regardless; a partial
/// failure mid-list leaves the earlier notifications in place.
pub(crate) async fn close_recruitment(pool: &SqlitePool, recruitment_id: &str) -> AppResult<()> {
    let Some((owner_id, title, _status, _room)) = store::recruitments::get(pool, recruitment_id).await?
    else {
        return Err(AppError::NotFound("募集が見つかりません".to_owned()));
    };

    for participant in store::recruitments::active_participants(pool, recruitment_id).await? {
        if let Err(e) = store::notifications::insert(
            pool,
            &participant,
            &owner_id,
            "recruitment_closed",
            &format!("「{title}」は終了しました"),
            None,
        )
        .await
        {
            warn!("close notification for {participant} failed: {e}");
        }
    }

    store::recruitments::delete(pool, recruitment_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing;

    #[tokio::test]
    async fn close_notifies_active_participants_and_always_deletes() {
        let pool = testing::pool().await;
        testing::seed_user(&pool, "owner", "主", Some("o@example.com"), None).await;
        testing::seed_user(&pool, "p1", "一人目", Some("p1@example.com"), None).await;
        testing::seed_user(&pool, "p2", "二人目", None, None).await;
        testing::seed_user(&pool, "p3", "三人目", Some("p3@example.com"), None).await;

        let room = store::conversations::create(&pool).await.unwrap();
        let rec = store::recruitments::insert(
            &pool,
            &store::recruitments::NewRecruitment {
                owner_id: "owner",
                title: "スクワット会",
                description: "",
                body_part: None,
                event_at: None,
                location: None,
                level: None,
                chat_room_id: &room,
            },
        )
        .await
        .unwrap();
        for p in ["p1", "p2", "p3"] {
            store::recruitments::add_participant(&pool, &rec, p).await.unwrap();
        }
        store::recruitments::set_participant_status(&pool, &rec, "p1", "approved").await.unwrap();
        store::recruitments::set_participant_status(&pool, &rec, "p3", "rejected").await.unwrap();

        close_recruitment(&pool, &rec).await.unwrap();

        // pending and approved participants got the in-app row, rejected did not
        for (user, expected) in [("p1", 1), ("p2", 1), ("p3", 0)] {
            let rows = store::notifications::list_for_user(&pool, user).await.unwrap();
            assert_eq!(rows.len(), expected, "user {user}");
        }
        assert!(store::recruitments::get(&pool, &rec).await.unwrap().is_none());
        assert!(store::recruitments::participant_status(&pool, &rec, "p1").await.unwrap().is_none());
    }
}
