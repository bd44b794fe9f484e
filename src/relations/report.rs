use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, store, AppResult};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ReportTarget {
    User,
    Recruitment,
    Group,
}

impl ReportTarget {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ReportTarget::User => "user",
            ReportTarget::Recruitment => "recruitment",
            ReportTarget::Group => "group",
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct ReportBody {
    target_id: String,
    target_type: ReportTarget,
    reason: Option<String>,
    details: Option<String>,
}

#[debug_handler]
pub(crate) async fn report(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(body): Json<ReportBody>,
) -> AppResult<Json<Value>> {
    let user_id = session::require_user(&session).await?;
    let id = file_report(&db_pool, &user_id, &body).await?;
    Ok(Json(json!({ "id": id })))
}

pub(crate) async fn file_report(
    pool: &SqlitePool,
    reporter_id: &str,
    body: &ReportBody,
) -> AppResult<String> {
    let reason = body
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or("other");
    let details = body
        .details
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    store::reports::insert(
        pool,
        reporter_id,
        &body.target_id,
        body.target_type.as_str(),
        reason,
        details,
    )
    .await
}
