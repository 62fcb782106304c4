//! Refresh Session Use Case
//!
//! Exchanges a valid refresh token for a fresh access/refresh pair. The
//! user record is re-loaded so a deactivation that happened after issuance
//! cuts the renewal chain even though individual tokens stay stateless.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::authenticate::AuthenticateOutput;
use crate::application::token::{TokenKind, TokenService};
use crate::domain::repository::IdentityRepository;
use crate::error::{IdentityError, IdentityResult};

/// Refresh session use case
pub struct RefreshSessionUseCase<R>
where
    R: IdentityRepository,
{
    repo: Arc<R>,
    tokens: Arc<TokenService>,
}

impl<R> RefreshSessionUseCase<R>
where
    R: IdentityRepository,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenService>) -> Self {
        Self { repo, tokens }
    }

    pub async fn execute(&self, refresh_token: &str) -> IdentityResult<AuthenticateOutput> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;

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

        let tokens = self.tokens.issue(&user)?;

        tracing::debug!(user_id = %user.user_id, "Session refreshed");

        Ok(AuthenticateOutput { user, tokens })
    }
}
