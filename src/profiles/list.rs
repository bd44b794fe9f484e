use axum::{debug_handler, extract::{Query, State}, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::{geo, store, AppResult};

#[derive(Deserialize)]
pub struct ListQuery {
    prefecture: Option<String>,
}

/// Geography-scoped listing for `GET /api/users?prefecture=<canonical>|all`.
/// The filter matches every stored variant of the canonical name.
#[debug_handler]
pub async fn users_by_prefecture(
    State(db_pool): State<SqlitePool>,
    Query(ListQuery { prefecture }): Query<ListQuery>,
) -> AppResult<Json<Value>> {
    let rows = match prefecture.as_deref() {
        None | Some("all") | Some("") => store::profiles::list_all(&db_pool).await?,
        Some(name) => {
            store::profiles::list_by_prefecture(&db_pool, &geo::match_values(name)).await?
        }
    };

    let users: Vec<Value> = rows
        .into_iter()
        .map(|(user_id, nickname, prefecture, avatar_url)| {
            json!({
                "user_id": user_id,
                "nickname": nickname,
                "prefecture": prefecture.as_deref().map(geo::normalize),
                "avatar_url": avatar_url,
            })
        })
        .collect();
    Ok(Json(json!({ "users": users })))
}
