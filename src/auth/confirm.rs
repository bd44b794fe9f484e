//! Signed "confirm your email before continuing" interstitial. The claims
//! travel in an HTTP-only cookie, HS256-signed, and the cookie is cleared
//! the moment it is used.

use axum::{
    debug_handler,
    extract::{Query, State},
    http::{header::{COOKIE, SET_COOKIE}, HeaderMap},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Json,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppError, AppResult, Config};

const COOKIE_NAME: &str = "fitpeak_confirm";
const TOKEN_TTL_SECS: i64 = 900;

#[derive(Serialize, Deserialize)]
struct ConfirmClaims {
    email: String,
    url: String,
    exp: i64,
}

#[derive(Deserialize)]
pub(crate) struct StartQuery {
    email: String,
    url: String,
}

#[debug_handler]
pub(crate) async fn start(
    Query(StartQuery { email, url }): Query<StartQuery>,
    State(config): State<Config>,
) -> AppResult<Response> {
    let claims = ConfirmClaims {
        email,
        url,
        exp: time::OffsetDateTime::now_utc().unix_timestamp() + TOKEN_TTL_SECS,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.token_secret.as_bytes()),
    )
    .map_err(|e| AppError::Other(anyhow::Error::from(e)))?;

    let cookie = format!(
        "{COOKIE_NAME}={token}; HttpOnly; Path=/; Max-Age={TOKEN_TTL_SECS}; SameSite=Lax"
    );
    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "confirm_url": "/auth/confirm" })),
    )
        .into_response())
}

#[debug_handler]
pub(crate) async fn confirm(
    State(config): State<Config>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let invalid = || AppError::InvalidArgument("確認トークンが無効か期限切れです".to_owned());

    let token = cookie_value(&headers, COOKIE_NAME).ok_or_else(invalid)?;
    let claims = decode::<ConfirmClaims>(
        &token,
        &DecodingKey::from_secret(config.token_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|_| invalid())?
    .claims;

    let clear = format!("{COOKIE_NAME}=; HttpOnly; Path=/; Max-Age=0; SameSite=Lax");
    Ok((
        AppendHeaders([(SET_COOKIE, clear)]),
        Redirect::to(&claims.url),
    )
        .into_response())
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split("; "))
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('=').map(str::to_owned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_header_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "foo=1; fitpeak_confirm=abc.def.ghi; bar=2".parse().unwrap());
        assert_eq!(cookie_value(&headers, COOKIE_NAME).as_deref(), Some("abc.def.ghi"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn token_round_trip_and_expiry() {
        let secret = b"test-secret";
        let fresh = ConfirmClaims {
            email: "taro@example.com".to_owned(),
            url: "/p/me".to_owned(),
            exp: time::OffsetDateTime::now_utc().unix_timestamp() + 60,
        };
        let token = encode(&Header::default(), &fresh, &EncodingKey::from_secret(secret)).unwrap();
        let decoded = decode::<ConfirmClaims>(
            &token,
            &DecodingKey::from_secret(secret),
            &Validation::new(Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(decoded.claims.email, "taro@example.com");
        assert_eq!(decoded.claims.url, "/p/me");

        // wrong key fails
        assert!(decode::<ConfirmClaims>(
            &token,
            &DecodingKey::from_secret(b"other"),
            &Validation::new(Algorithm::HS256),
        )
        .is_err());

        // expired token fails even with the right key
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let stale = ConfirmClaims {
            email: "taro@example.com".to_owned(),
            url: "/".to_owned(),
            exp: time::OffsetDateTime::now_utc().unix_timestamp() - 120,
        };
        let token = encode(&Header::default(), &stale, &EncodingKey::from_secret(secret)).unwrap();
        assert!(decode::<ConfirmClaims>(
            &token,
            &DecodingKey::from_secret(secret),
            &validation,
        )
        .is_err());
    }
}
