use axum::{debug_handler, extract::{Query, State}, response::Redirect};
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeVerifier, TokenResponse};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{
    session::{CSRF_STATE, PKCE_VERIFIER, RETURN_URL, USER_ID},
    store, AppResult, AppState, Config, GetField,
};

use super::{clients, create_profile};

#[derive(Deserialize)]
pub(crate) struct LockinQuery {
    pub(crate) state: Option<String>,
    pub(crate) code: Option<String>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn lockin(
    Query(LockinQuery { state, code }): Query<LockinQuery>,
    State(db_pool): State<SqlitePool>,
    State(config): State<Config>,
    session: Session,
) -> AppResult<Redirect> {
    let state = CsrfToken::new(state.ok_or("OAuth: without state")?);
    let code = AuthorizationCode::new(code.ok_or("OAuth: without code")?);

    let Some(stored_state) = session.get::<String>(CSRF_STATE).await? else {
        return Err("no csrf_state")?;
    };
    if state.secret().as_str() != stored_state.as_str() {
        return Err("csrf tokens don't match")?;
    }

    let Some(pkce_verifier) = session.get::<String>(PKCE_VERIFIER).await? else {
        return Err("no pkce_verifier")?;
    };

    let client = clients::line_client(&config)?;
    let http_client = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let token_result = client
        .exchange_code(code)
        .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
        .request_async(&http_client)
        .await?;

    let access_token = token_result.access_token().secret();
    let body: serde_json::Value = http_client
        .get(clients::PROFILE_URL)
        .bearer_auth(access_token)
        .send()
        .await?
        .json()
        .await?;

    let line_user_id = body.get_str_field("userId")?;
    let display_name = body.get_str_field("displayName").ok();

    let user_id = match store::profiles::find_by_line_id(&db_pool, &line_user_id).await? {
        Some(user_id) => user_id,
        None => create_profile(&db_pool, &line_user_id, display_name.as_deref()).await?,
    };
    session.insert(USER_ID, user_id.clone()).await?;
    info!("welcome u/{user_id}");

    let return_url: Option<String> = session.get(RETURN_URL).await?;
    Ok(Redirect::to(return_url.as_deref().unwrap_or("/")))
}
