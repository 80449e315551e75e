use anyhow::Result;
use axum::http::{header, HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use shortify::api;
use shortify::auth::AuthService;
use shortify::config::{Config, DatabaseBackend};
use shortify::redirect;
use shortify::storage::{PostgresStorage, SqliteStorage, Storage};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Initialize storage
    let storage: Arc<dyn Storage> = match config.database.backend {
        DatabaseBackend::Sqlite => {
            info!("Using SQLite storage: {}", config.database.url);
            Arc::new(
                SqliteStorage::new(&config.database.url, config.database.max_connections).await?,
            )
        }
        DatabaseBackend::Postgres => {
            info!("Using PostgreSQL storage: {}", config.database.url);
            Arc::new(
                PostgresStorage::new(&config.database.url, config.database.max_connections)
                    .await?,
            )
        }
    };

    info!("Initializing database...");
    storage.init().await?;
    info!("Database initialized successfully");

    let auth_service = Arc::new(AuthService::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_secs,
    ));

    // One listener serves both surfaces: the JSON API under /api and the
    // redirect route at the root.
    let mut app = api::create_api_router(Arc::clone(&storage), auth_service)
        .merge(redirect::create_redirect_router(Arc::clone(&storage)));

    if let Some(origin) = config.cors_origin.as_deref() {
        info!("Allowing CORS requests from {}", origin);
        let cors = CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods([Method::GET, Method::POST, Method::PATCH])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true);
        app = app.layer(cors);
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 Server listening on http://{}", addr);
    info!("   - API endpoints available at http://{}/api/...", addr);
    info!("   - Redirects served from http://{}/<slug>", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
