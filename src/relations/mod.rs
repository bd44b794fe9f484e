mod block;
mod follow;
mod report;

use axum::{routing::post, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{target_id}/follow", post(follow::follow).delete(follow::unfollow))
        .route("/{target_id}/block", post(block::block).delete(block::unblock))
        .route("/report", post(report::report))
}
