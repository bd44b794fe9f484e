use std::{fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Environment-driven configuration. Optional provider keys degrade the
/// matching feature (email, LINE push, LINE login) to a no-op when absent.
#[derive(Clone)]
pub struct Config {
    pub base_url: String,
    pub port: u16,
    pub database_url: String,

    pub line_channel_id: Option<String>,
    pub line_channel_secret: Option<String>,

    pub resend_api_key: Option<String>,
    pub email_from: Option<String>,

    pub line_messaging_token: Option<String>,

    pub token_secret: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            base_url: try_load("APP_BASE_URL", "http://localhost:8080"),
            port: try_load("PORT", "8080"),
            database_url: try_load("DATABASE_URL", "sqlite:fitpeak.db"),
            line_channel_id: opt("LINE_CHANNEL_ID"),
            line_channel_secret: opt("LINE_CHANNEL_SECRET"),
            resend_api_key: opt("RESEND_API_KEY"),
            email_from: opt("EMAIL_FROM"),
            line_messaging_token: opt("LINE_MESSAGING_TOKEN"),
            token_secret: try_load("TOKEN_SECRET", "dev-only-secret"),
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self {
            base_url: "http://localhost:8080".to_owned(),
            port: 8080,
            database_url: "sqlite::memory:".to_owned(),
            line_channel_id: None,
            line_channel_secret: None,
            resend_api_key: None,
            email_from: None,
            line_messaging_token: None,
            token_secret: "test-secret".to_owned(),
        }
    }
}

fn opt(key: &str) -> Option<String> {
    let value = dotenv::var(key).ok().filter(|v| !v.is_empty());
    if value.is_none() {
        warn!("{key} not set, the feature depending on it is disabled");
    }
    value
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    dotenv::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_owned()
        })
        .parse()
        .map_err(|e| {
            warn!("invalid {key} value: {e}");
        })
        .expect("environment misconfigured")
}
