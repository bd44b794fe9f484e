use axum::{debug_handler, extract::{Path, State}, Json};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{geo, sanitize, session, store, AppError, AppResult};

#[debug_handler]
pub(crate) async fn profile(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(profile_user_id): Path<String>,
) -> AppResult<Json<Value>> {
    let viewer_id = session::require_user(&session).await?;
    Ok(Json(view_profile(&db_pool, &viewer_id, &profile_user_id).await?))
}

/// Profile as seen by `viewer_id`: a block in either direction hides the
/// profile entirely, and per-field visibility flags gate the optional
/// attributes (except for the owner looking at themselves).
pub(crate) async fn view_profile(
    pool: &SqlitePool,
    viewer_id: &str,
    profile_user_id: &str,
) -> AppResult<Value> {
    let not_found = || AppError::NotFound("ユーザーが見つかりません".to_owned());

    if viewer_id != profile_user_id
        && store::blocks::either_direction(pool, viewer_id, profile_user_id).await?
    {
        return Err(not_found());
    }

    let row = store::profiles::get(pool, profile_user_id).await?.ok_or_else(not_found)?;
    let (followers, following) = store::follows::counts(pool, profile_user_id).await?;

    let own = viewer_id == profile_user_id;
    let mut profile = json!({
        "user_id": row.user_id,
        "nickname": row.nickname,
        "bio": row.bio,
        "avatar_url": row.avatar_url,
        "header_url": row.header_url,
        "achievements": sanitize::parse_list(row.achievements.as_deref()),
        "certifications": sanitize::parse_list(row.certifications.as_deref()),
        "followers": followers,
        "following": following,
    });

    if own || row.show_prefecture {
        profile["prefecture"] = row.prefecture.as_deref().map(geo::normalize).into();
    }
    if own || row.show_home_gym {
        profile["home_gym"] = row.home_gym.into();
    }
    if own || row.show_lift_maxes {
        profile["bench_press_max"] = row.bench_press_max.into();
        profile["squat_max"] = row.squat_max.into();
        profile["deadlift_max"] = row.deadlift_max.into();
    }
    sanitize::normalize_nested(&mut profile);
    Ok(profile)
}
