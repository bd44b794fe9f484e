use tower_sessions::Session;

use crate::{AppError, AppResult};

pub const USER_ID: &str = "user_id";
pub const CSRF_STATE: &str = "csrf_state";
pub const PKCE_VERIFIER: &str = "pkce_verifier";
pub const RETURN_URL: &str = "return_url";

pub async fn require_user(session: &Session) -> AppResult<String> {
    session
        .get::<String>(USER_ID)
        .await?
        .ok_or(AppError::AuthRequired)
}
