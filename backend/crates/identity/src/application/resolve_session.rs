//! Resolve Session Use Case
//!
//! Turns a bearer token into the caller's identity for the lifetime of one
//! request. The flow is strictly linear:
//!
//! verify (kind=access) -> decode subject -> load record -> active check
//!
//! Each stage failure maps to its own terminal error; there is exactly one
//! store lookup per call and no retry. Store errors propagate as a
//! retryable condition rather than an authentication failure, and
//! cancellation of the lookup future is passed straight through.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::token::{TokenClaims, TokenKind, TokenService};
use crate::domain::entity::user::User;
use crate::domain::repository::IdentityRepository;
use crate::error::{IdentityError, IdentityResult};

/// The authenticated identity for one request. Ephemeral: owned by the
/// request-handling context and discarded on completion, never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub claims: TokenClaims,
}

/// Resolve session use case
pub struct ResolveSessionUseCase<R>
where
    R: IdentityRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
}

impl<R> ResolveSessionUseCase<R>
where
    R: IdentityRepository,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    pub async fn execute(&self, bearer_token: &str) -> IdentityResult<Session> {
        let claims = self.tokens.verify(bearer_token, TokenKind::Access)?;

        // Issuance writes the subject itself, so this only fails on tokens
        // signed by a misbehaving peer sharing our secret. Handled anyway.
        let user_id =
            UserId::parse_text(&claims.sub).map_err(|_| IdentityError::MalformedSubject)?;

        let user = self
            .repo
            .find_by_id(&user_id)
            .await?
            .ok_or(IdentityError::UserNotFound)?;

        if !user.is_active {
            return Err(IdentityError::AccountInactive);
        }

        Ok(Session { user, claims })
    }
}
