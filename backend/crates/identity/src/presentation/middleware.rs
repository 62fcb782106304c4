//! Identity Middleware
//!
//! Middleware for requiring a resolved session on protected routes.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::ResolveSessionUseCase;
use crate::domain::repository::IdentityRepository;
use crate::error::IdentityError;
use crate::presentation::handlers::IdentityAppState;

/// Middleware that requires a valid bearer token.
///
/// Resolves the token into a [`crate::application::Session`] and stores it
/// in request extensions for downstream handlers. Any resolution failure
/// short-circuits with that failure's wire mapping.
pub async fn require_session<R>(
    State(state): State<IdentityAppState<R>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    R: IdentityRepository + Clone + Send + Sync + 'static,
{
    let token = match extract_bearer_token(req.headers()) {
        Some(token) => token,
        None => {
            return Err(IdentityError::Token(crate::TokenError::Malformed).into_response());
        }
    };

    let use_case = ResolveSessionUseCase::new(state.repo.clone(), state.tokens.clone());

    let session = match use_case.execute(&token).await {
        Ok(session) => session,
        Err(e) => return Err(e.into_response()),
    };

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// Scheme matching is case-insensitive; surrounding whitespace is ignored.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    Some(token.to_string())
}
