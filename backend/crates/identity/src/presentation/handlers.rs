//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, response::IntoResponse};
use std::sync::Arc;

use platform::password::CredentialHasher;

use crate::application::config::IdentityConfig;
use crate::application::token::TokenService;
use crate::application::{
    AuthenticateInput, AuthenticateUseCase, RefreshSessionUseCase, RegisterInput, RegisterUseCase,
    Session,
};
use crate::domain::repository::IdentityRepository;
use crate::error::IdentityResult;
use crate::presentation::dto::{
    LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, UserResponse,
};

/// Shared state for identity handlers
#[derive(Clone)]
pub struct IdentityAppState<R>
where
    R: IdentityRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<IdentityConfig>,
    pub hasher: Arc<CredentialHasher>,
    pub tokens: Arc<TokenService>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /register
pub async fn register<R>(
    State(state): State<IdentityAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> IdentityResult<impl IntoResponse>
where
    R: IdentityRepository + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.config.clone(),
    );

    let input = RegisterInput {
        email: req.email,
        username: req.username,
        password: req.password,
        first_name: req.first_name,
        last_name: req.last_name,
        phone_number: req.phone_number,
    };

    let user = use_case.execute(input).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

// ============================================================================
// Login
// ============================================================================

/// POST /login
pub async fn login<R>(
    State(state): State<IdentityAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> IdentityResult<Json<TokenResponse>>
where
    R: IdentityRepository + Clone + Send + Sync + 'static,
{
    let use_case = AuthenticateUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let input = AuthenticateInput {
        identifier: req.email_or_username,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(TokenResponse::from(&output)))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /refresh
pub async fn refresh<R>(
    State(state): State<IdentityAppState<R>>,
    Json(req): Json<RefreshRequest>,
) -> IdentityResult<Json<TokenResponse>>
where
    R: IdentityRepository + Clone + Send + Sync + 'static,
{
    let use_case = RefreshSessionUseCase::new(state.repo.clone(), state.tokens.clone());

    let output = use_case.execute(&req.refresh_token).await?;

    Ok(Json(TokenResponse::from(&output)))
}

// ============================================================================
// Me (requires authentication)
// ============================================================================

/// GET /me
///
/// The resolved [`Session`] is injected by the `require_session` middleware.
pub async fn me(Extension(session): Extension<Session>) -> Json<UserResponse> {
    Json(UserResponse::from(&session.user))
}
