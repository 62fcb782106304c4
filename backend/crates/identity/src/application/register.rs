//! Register Use Case
//!
//! Creates a new user account: validates input, rejects duplicates, hashes
//! the password, persists the record.

use std::sync::Arc;

use platform::password::{CredentialHasher, PlainPassword};

use crate::application::config::IdentityConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{IdentityError, IdentityResult};

/// Registration input
pub struct RegisterInput {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: IdentityRepository,
{
    repo: Arc<R>,
    hasher: Arc<CredentialHasher>,
    config: Arc<IdentityConfig>,
}

impl<R> RegisterUseCase<R>
where
    R: IdentityRepository,
{
    pub fn new(repo: Arc<R>, hasher: Arc<CredentialHasher>, config: Arc<IdentityConfig>) -> Self {
        Self {
            repo,
            hasher,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> IdentityResult<User> {
        let email = Email::new(input.email)
            .map_err(|e| IdentityError::Validation(e.message().to_string()))?;
        let username = UserName::new(input.username)
            .map_err(|e| IdentityError::Validation(e.message().to_string()))?;

        // Weak passwords are the caller's fault, not an internal failure.
        let password = PlainPassword::new(input.password, &self.config.credential)
            .map_err(|e| IdentityError::Validation(e.to_string()))?;

        let first_name = input.first_name.trim().to_string();
        let last_name = input.last_name.trim().to_string();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(IdentityError::Validation(
                "First and last name are required".to_string(),
            ));
        }

        if self.repo.exists_by_email_or_username(&email, &username).await? {
            return Err(IdentityError::Conflict);
        }

        // Memory-hard hashing takes tens of milliseconds; keep it off the
        // request-accepting threads.
        let hasher = self.hasher.clone();
        let credential = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| IdentityError::Internal(e.to_string()))?
            .map_err(|e| IdentityError::Internal(e.to_string()))?;

        let user = User::new(
            email,
            username,
            first_name,
            last_name,
            normalize_phone(input.phone_number.as_deref()),
            credential,
        );

        self.repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            username = %user.username,
            "User registered"
        );

        Ok(user)
    }
}

/// Keep only digits; empty results collapse to None.
fn normalize_phone(phone: Option<&str>) -> Option<String> {
    let digits: String = phone?.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() { None } else { Some(digits) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone(None), None);
        assert_eq!(normalize_phone(Some("")), None);
        assert_eq!(normalize_phone(Some("+1 (555) 123-4567")), Some("15551234567".to_string()));
        assert_eq!(normalize_phone(Some("no digits")), None);
    }
}
