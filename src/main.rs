use axum::{routing::{get, post}, Router};
use fitpeak::{auth, conversations, groups, notify, profiles, recruitments, relations, storage, store, AppState, Config, Notifier};
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::cors::CorsLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load();

    let db_pool = SqlitePoolOptions::new()
        .max_connections(16)
        .connect(&config.database_url)
        .await
        .expect("database connection failed");
    store::schema::init(&db_pool).await.expect("schema bootstrap failed");

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(30)));

    let notifier = Notifier::new(config.clone());
    let port = config.port;
    let app_state = AppState { db_pool, config, notifier };

    let api = Router::new()
        .route("/users", get(profiles::users_by_prefecture))
        .route("/storage/init", post(storage::init_bucket))
        .route("/notifications", get(notify::inbox::list))
        .route("/notifications/{id}/read", post(notify::inbox::mark_read))
        .nest("/notify", notify::relay::router());

    let app = Router::new()
        .merge(auth::router())
        .nest("/p", profiles::router())
        .nest("/rel", relations::router())
        .nest("/c", conversations::router())
        .nest("/g", groups::router())
        .nest("/rec", recruitments::router())
        .nest("/api", api)
        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await.unwrap();
    info!("listening on :{port}");
    axum::serve(listener, app).await.unwrap();
}
