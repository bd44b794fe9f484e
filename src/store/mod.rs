//! Typed access to the relational store. Every function takes an explicit
//! pool handle; nothing in here reaches for ambient state.

pub mod blocks;
pub mod conversations;
pub mod follows;
pub mod groups;
pub mod notifications;
pub mod profiles;
pub mod recruitments;
pub mod reports;
pub mod schema;

pub(crate) fn now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

#[cfg(test)]
pub(crate) mod testing {
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::SqlitePool;

    /// Single-connection in-memory pool; more connections would each see
    /// their own empty database.
    pub(crate) async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        super::schema::init(&pool).await.unwrap();
        pool
    }

    pub(crate) async fn seed_user(
        pool: &SqlitePool,
        user_id: &str,
        nickname: &str,
        email: Option<&str>,
        line_user_id: Option<&str>,
    ) {
        super::profiles::create(pool, user_id, nickname, email, line_user_id)
            .await
            .unwrap();
    }
}
