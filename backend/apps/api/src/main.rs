//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; application-level errors use
//! `kernel::error::AppError`. Misconfiguration (missing or empty signing
//! secret, unknown algorithm) aborts startup here instead of surfacing
//! per-request.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    Router, http,
    http::{Method, header},
};
use identity::{IdentityConfig, PgIdentityRepository, identity_router};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,identity=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Identity configuration. SECRET_KEY is mandatory and must be
    // non-empty; validate() inside the router build enforces the rest.
    let config = identity_config_from_env()?;

    // CORS configuration
    let frontend_origins = env::var("CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let repo = PgIdentityRepository::new(pool.clone());
    let auth_routes = identity_router(repo, config)
        .map_err(|e| anyhow::anyhow!("identity configuration rejected: {e}"))?;

    let app = Router::new()
        .nest("/api/v1/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8000".to_string())
        .parse()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Assemble the identity configuration from environment variables.
///
/// The secret value itself never reaches a log line; only its absence does.
fn identity_config_from_env() -> anyhow::Result<IdentityConfig> {
    let secret = env::var("SECRET_KEY")
        .map_err(|_| anyhow::anyhow!("SECRET_KEY must be set in environment"))?;
    if secret.is_empty() {
        anyhow::bail!("SECRET_KEY must not be empty");
    }

    let algorithm = match env::var("ALGORITHM") {
        Ok(name) => IdentityConfig::parse_algorithm(&name)?,
        Err(_) => IdentityConfig::default().algorithm,
    };

    let access_minutes: u64 = env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
        .unwrap_or_else(|_| "30".to_string())
        .parse()?;
    let refresh_days: u64 = env::var("REFRESH_TOKEN_EXPIRE_DAYS")
        .unwrap_or_else(|_| "7".to_string())
        .parse()?;

    let defaults = IdentityConfig::default();

    Ok(IdentityConfig {
        signing_secret: secret.into_bytes(),
        algorithm,
        issuer: env::var("TOKEN_ISSUER").unwrap_or(defaults.issuer),
        audience: env::var("TOKEN_AUDIENCE").unwrap_or(defaults.audience),
        access_ttl: Duration::from_secs(access_minutes * 60),
        refresh_ttl: Duration::from_secs(refresh_days * 24 * 3600),
        credential: defaults.credential,
    })
}
