//! Authenticate Use Case
//!
//! Verifies a password against the stored credential and mints a token
//! pair. Unknown identifier and wrong password are indistinguishable to the
//! caller; only an inactive account gets its own error so the UI can
//! message it differently.

use std::sync::Arc;

use platform::password::{CredentialHasher, PlainPassword};

use crate::application::config::IdentityConfig;
use crate::application::token::{TokenPair, TokenService};
use crate::domain::entity::user::User;
use crate::domain::repository::IdentityRepository;
use crate::error::{IdentityError, IdentityResult};

/// Authentication input
pub struct AuthenticateInput {
    /// Email or username
    pub identifier: String,
    pub password: String,
}

/// Authentication output
#[derive(Debug)]
pub struct AuthenticateOutput {
    pub user: User,
    pub tokens: TokenPair,
}

/// Authenticate use case
pub struct AuthenticateUseCase<R>
where
    R: IdentityRepository,
{
    repo: Arc<R>,
    hasher: Arc<CredentialHasher>,
    tokens: Arc<TokenService>,
    config: Arc<IdentityConfig>,
}

impl<R> AuthenticateUseCase<R>
where
    R: IdentityRepository,
{
    pub fn new(
        repo: Arc<R>,
        hasher: Arc<CredentialHasher>,
        tokens: Arc<TokenService>,
        config: Arc<IdentityConfig>,
    ) -> Self {
        Self {
            repo,
            hasher,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, input: AuthenticateInput) -> IdentityResult<AuthenticateOutput> {
        let identifier = input.identifier.trim().to_lowercase();
        if identifier.is_empty() {
            return Err(IdentityError::InvalidCredentials);
        }

        // Input that fails password policy can never match a stored hash;
        // collapse it into the same vague error as a wrong password.
        let password = PlainPassword::new(input.password, &self.config.credential)
            .map_err(|_| IdentityError::InvalidCredentials)?;

        let user = self
            .repo
            .find_by_email_or_username(&identifier)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        // Verification re-runs the memory-hard function; same rule as
        // hashing, off the request-accepting threads.
        let hasher = self.hasher.clone();
        let credential = user.credential.clone();
        let password_valid =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &credential))
                .await
                .map_err(|e| IdentityError::Internal(e.to_string()))?;

        if !password_valid {
            return Err(IdentityError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(IdentityError::AccountInactive);
        }

        let mut user = user;
        user.record_login();
        self.repo.update(&user).await?;

        let tokens = self.tokens.issue(&user)?;

        tracing::info!(user_id = %user.user_id, "User authenticated");

        Ok(AuthenticateOutput { user, tokens })
    }
}
