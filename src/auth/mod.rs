mod clients;
mod confirm;
mod lockin;
mod login;
mod logout;

use axum::{routing::get, Router};
use rand::seq::IndexedRandom;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::{store, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login))
        .route("/lockin", get(lockin::lockin))
        .route("/logout", get(logout::logout))
        .route("/auth/confirm/start", get(confirm::start))
        .route("/auth/confirm", get(confirm::confirm))
}

/// First-login profile creation. A missing display name gets a random alias.
pub(crate) async fn create_profile(
    pool: &SqlitePool,
    line_user_id: &str,
    display_name: Option<&str>,
) -> AppResult<String> {
    let adjectives = [
        "熱血", "静かな", "不屈の", "陽気な", "鋼の", "早起きの", "夜型の",
        "粘り強い", "爆発的な", "堅実な", "気まぐれな", "全力の",
    ];
    let nouns = [
        "ベンチプレッサー", "スクワッター", "デッドリフター", "トレーニー",
        "ランナー", "リフター", "筋トレ民", "ジム通い",
    ];

    let nickname = match display_name.filter(|name| !name.trim().is_empty()) {
        Some(name) => name.trim().to_owned(),
        None => format!(
            "{}{}",
            adjectives.choose(&mut rand::rng()).unwrap_or(&""),
            nouns.choose(&mut rand::rng()).unwrap_or(&"トレーニー"),
        ),
    };

    let user_id = Uuid::now_v7().to_string();
    info!("creating profile {user_id} for line user");
    store::profiles::create(pool, &user_id, &nickname, None, Some(line_user_id)).await?;
    Ok(user_id)
}
