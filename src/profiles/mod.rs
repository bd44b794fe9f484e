mod list;
mod page;
mod update;

use axum::{routing::{get, put}, Router};

use crate::AppState;

pub use list::users_by_prefecture;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", put(update::update_me))
        .route("/{user_id}", get(page::profile))
}
