//! Identity Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use kernel::error::app_error::{AppError, AppResult};
use platform::password::CredentialHasher;

use crate::application::config::IdentityConfig;
use crate::application::token::TokenService;
use crate::domain::repository::IdentityRepository;
use crate::infra::postgres::PgIdentityRepository;
use crate::presentation::handlers::{self, IdentityAppState};
use crate::presentation::middleware;

/// Create the identity router with the PostgreSQL repository.
///
/// Fails when the configuration is invalid; callers should treat that as a
/// startup abort, not a recoverable condition.
pub fn identity_router(repo: PgIdentityRepository, config: IdentityConfig) -> AppResult<Router> {
    identity_router_generic(repo, config)
}

/// Create a generic identity router for any repository implementation.
pub fn identity_router_generic<R>(repo: R, config: IdentityConfig) -> AppResult<Router>
where
    R: IdentityRepository + Clone + Send + Sync + 'static,
{
    config
        .validate()
        .map_err(|e| AppError::internal(format!("Invalid identity configuration: {e}")))?;

    let hasher = CredentialHasher::new(config.credential.clone())
        .map_err(|e| AppError::internal(format!("Invalid credential parameters: {e}")))?;
    let tokens = TokenService::new(&config);

    let state = IdentityAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        hasher: Arc::new(hasher),
        tokens: Arc::new(tokens),
    };

    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_session::<R>,
        ));

    Ok(Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/refresh", post(handlers::refresh::<R>))
        .merge(protected)
        .with_state(state))
}
