pub mod appresult;
pub mod auth;
pub mod config;
pub mod conversations;
pub mod geo;
pub mod groups;
pub mod notify;
pub mod profiles;
pub mod recruitments;
pub mod relations;
pub mod sanitize;
pub mod session;
pub mod storage;
pub mod store;

use axum::extract::FromRef;
use sqlx::SqlitePool;

pub use appresult::{AppError, AppResult};
pub use config::Config;
pub use notify::Notifier;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Config,
    pub notifier: Notifier,
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> AppResult<String>;
}

impl GetField for serde_json::Value {
    fn get_str_field(&self, field: &str) -> AppResult<String> {
        Ok(
            self.get(field)
            .ok_or(format!("expected {field} in {self}"))?
            .as_str()
            .ok_or(format!("expected {field} in {self} to be string"))?
            .to_owned()
        )
    }
}
