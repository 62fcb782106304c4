//! Cross-component tests for the identity crate
//!
//! Exercises register -> authenticate -> resolve against an in-memory
//! repository, plus every terminal failure of the session resolver.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use kernel::id::UserId;
use platform::password::CredentialHasher;

use crate::application::config::IdentityConfig;
use crate::application::token::{TokenClaims, TokenError, TokenKind, TokenService};
use crate::application::{
    AuthenticateInput, AuthenticateUseCase, RefreshSessionUseCase, RegisterInput, RegisterUseCase,
    ResolveSessionUseCase,
};
use crate::domain::entity::user::User;
use crate::domain::repository::IdentityRepository;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::{IdentityError, IdentityResult};

// ============================================================================
// In-memory repository
// ============================================================================

/// HashMap-backed stand-in for the identity store. `fail_lookups` simulates
/// an unavailable store.
#[derive(Clone, Default)]
struct MemoryIdentityRepository {
    users: Arc<Mutex<HashMap<UserId, User>>>,
    fail_lookups: Arc<AtomicBool>,
}

impl MemoryIdentityRepository {
    fn set_failing(&self, failing: bool) {
        self.fail_lookups.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> IdentityResult<()> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(IdentityError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

impl IdentityRepository for MemoryIdentityRepository {
    async fn create(&self, user: &User) -> IdentityResult<()> {
        self.check_available()?;
        self.users
            .lock()
            .unwrap()
            .insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> IdentityResult<Option<User>> {
        self.check_available()?;
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }

    async fn find_by_email_or_username(&self, identifier: &str) -> IdentityResult<Option<User>> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email.as_str() == identifier || u.username.as_str() == identifier)
            .cloned())
    }

    async fn exists_by_email_or_username(
        &self,
        email: &Email,
        username: &UserName,
    ) -> IdentityResult<bool> {
        self.check_available()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .any(|u| u.email == *email || u.username == *username))
    }

    async fn update(&self, user: &User) -> IdentityResult<()> {
        self.check_available()?;
        self.users
            .lock()
            .unwrap()
            .insert(user.user_id, user.clone());
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    repo: Arc<MemoryIdentityRepository>,
    config: Arc<IdentityConfig>,
    hasher: Arc<CredentialHasher>,
    tokens: Arc<TokenService>,
}

impl Harness {
    fn new() -> Self {
        let config = IdentityConfig::development();
        let hasher = CredentialHasher::new(config.credential.clone()).unwrap();
        let tokens = TokenService::new(&config);
        Self {
            repo: Arc::new(MemoryIdentityRepository::default()),
            config: Arc::new(config),
            hasher: Arc::new(hasher),
            tokens: Arc::new(tokens),
        }
    }

    fn register(&self) -> RegisterUseCase<MemoryIdentityRepository> {
        RegisterUseCase::new(self.repo.clone(), self.hasher.clone(), self.config.clone())
    }

    fn authenticate(&self) -> AuthenticateUseCase<MemoryIdentityRepository> {
        AuthenticateUseCase::new(
            self.repo.clone(),
            self.hasher.clone(),
            self.tokens.clone(),
            self.config.clone(),
        )
    }

    fn resolver(&self) -> ResolveSessionUseCase<MemoryIdentityRepository> {
        ResolveSessionUseCase::new(self.repo.clone(), self.tokens.clone())
    }

    fn refresher(&self) -> RefreshSessionUseCase<MemoryIdentityRepository> {
        RefreshSessionUseCase::new(self.repo.clone(), self.tokens.clone())
    }

    async fn register_default_user(&self) -> User {
        self.register()
            .execute(RegisterInput {
                email: "a@example.com".to_string(),
                username: "alice".to_string(),
                password: "SecurePass123".to_string(),
                first_name: "Alice".to_string(),
                last_name: "Example".to_string(),
                phone_number: None,
            })
            .await
            .unwrap()
    }
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[tokio::test]
async fn test_register_authenticate_resolve() {
    let harness = Harness::new();
    let registered = harness.register_default_user().await;
    assert!(registered.is_active);

    let output = harness
        .authenticate()
        .execute(AuthenticateInput {
            identifier: "a@example.com".to_string(),
            password: "SecurePass123".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(output.user.user_id, registered.user_id);
    assert!(output.user.last_login_at.is_some());

    // The access token resolves to the registered identity.
    let session = harness
        .resolver()
        .execute(&output.tokens.access_token)
        .await
        .unwrap();
    assert_eq!(session.user.user_id, registered.user_id);
    assert_eq!(session.claims.sub, registered.user_id.to_string());

    // The refresh token is rejected for ordinary calls, with the specific
    // wrong-kind error rather than a generic one.
    let err = harness
        .resolver()
        .execute(&output.tokens.refresh_token)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IdentityError::Token(TokenError::WrongTokenKind {
            expected: TokenKind::Access,
            actual: TokenKind::Refresh,
        })
    ));
}

#[tokio::test]
async fn test_authenticate_by_username() {
    let harness = Harness::new();
    harness.register_default_user().await;

    // Username works, case-insensitively.
    let output = harness
        .authenticate()
        .execute(AuthenticateInput {
            identifier: "Alice".to_string(),
            password: "SecurePass123".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(output.user.username.as_str(), "alice");
}

#[tokio::test]
async fn test_refresh_rotates_pair() {
    let harness = Harness::new();
    harness.register_default_user().await;

    let output = harness
        .authenticate()
        .execute(AuthenticateInput {
            identifier: "a@example.com".to_string(),
            password: "SecurePass123".to_string(),
        })
        .await
        .unwrap();

    let renewed = harness
        .refresher()
        .execute(&output.tokens.refresh_token)
        .await
        .unwrap();

    // The new access token resolves like the first one did.
    let session = harness
        .resolver()
        .execute(&renewed.tokens.access_token)
        .await
        .unwrap();
    assert_eq!(session.user.user_id, output.user.user_id);

    // An access token cannot drive renewal.
    let err = harness
        .refresher()
        .execute(&output.tokens.access_token)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IdentityError::Token(TokenError::WrongTokenKind { .. })
    ));
}

// ============================================================================
// Registration failures
// ============================================================================

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let harness = Harness::new();
    harness.register_default_user().await;

    // Same email, different username.
    let err = harness
        .register()
        .execute(RegisterInput {
            email: "a@example.com".to_string(),
            username: "bob".to_string(),
            password: "OtherPass456".to_string(),
            first_name: "Bob".to_string(),
            last_name: "Example".to_string(),
            phone_number: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::Conflict));

    // Same username, different email.
    let err = harness
        .register()
        .execute(RegisterInput {
            email: "b@example.com".to_string(),
            username: "alice".to_string(),
            password: "OtherPass456".to_string(),
            first_name: "Bob".to_string(),
            last_name: "Example".to_string(),
            phone_number: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::Conflict));
}

#[tokio::test]
async fn test_weak_password_is_validation_error() {
    let harness = Harness::new();
    let err = harness
        .register()
        .execute(RegisterInput {
            email: "a@example.com".to_string(),
            username: "alice".to_string(),
            password: "short".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Example".to_string(),
            phone_number: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::Validation(_)));
}

// ============================================================================
// Authentication failures
// ============================================================================

#[tokio::test]
async fn test_wrong_password_and_unknown_user_look_alike() {
    let harness = Harness::new();
    harness.register_default_user().await;

    let wrong_password = harness
        .authenticate()
        .execute(AuthenticateInput {
            identifier: "a@example.com".to_string(),
            password: "WrongPass123".to_string(),
        })
        .await
        .unwrap_err();

    let unknown_user = harness
        .authenticate()
        .execute(AuthenticateInput {
            identifier: "nobody@example.com".to_string(),
            password: "SecurePass123".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, IdentityError::InvalidCredentials));
    assert!(matches!(unknown_user, IdentityError::InvalidCredentials));
}

#[tokio::test]
async fn test_inactive_account_cannot_authenticate() {
    let harness = Harness::new();
    let mut user = harness.register_default_user().await;
    user.deactivate();
    harness.repo.update(&user).await.unwrap();

    let err = harness
        .authenticate()
        .execute(AuthenticateInput {
            identifier: "a@example.com".to_string(),
            password: "SecurePass123".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::AccountInactive));
}

// ============================================================================
// Resolver terminal failures
// ============================================================================

#[tokio::test]
async fn test_resolver_rejects_garbage_token() {
    let harness = Harness::new();
    let err = harness.resolver().execute("not.a.token").await.unwrap_err();
    assert!(matches!(err, IdentityError::Token(TokenError::Malformed)));
}

#[tokio::test]
async fn test_resolver_not_found_for_unknown_subject() {
    let harness = Harness::new();

    // A token for a user that was never persisted.
    let ghost = User::new(
        Email::new("ghost@example.com").unwrap(),
        UserName::new("ghost").unwrap(),
        "Ghost".to_string(),
        "Nobody".to_string(),
        None,
        platform::password::CredentialHash::from_storage("$argon2id$placeholder"),
    );
    let pair = harness.tokens.issue(&ghost).unwrap();

    let err = harness
        .resolver()
        .execute(&pair.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::UserNotFound));
}

#[tokio::test]
async fn test_resolver_inactive_is_distinct_from_not_found() {
    let harness = Harness::new();
    let user = harness.register_default_user().await;
    let pair = harness.tokens.issue(&user).unwrap();

    let mut user = user;
    user.deactivate();
    harness.repo.update(&user).await.unwrap();

    let err = harness
        .resolver()
        .execute(&pair.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::AccountInactive));
}

#[tokio::test]
async fn test_resolver_malformed_subject() {
    let harness = Harness::new();

    // Sign claims whose subject is not a decodable identifier. Requires the
    // shared secret, i.e. a misbehaving peer service.
    let now = chrono::Utc::now().timestamp();
    let claims = TokenClaims {
        sub: "definitely-not-an-id".to_string(),
        iss: harness.config.issuer.clone(),
        aud: harness.config.audience.clone(),
        iat: now,
        exp: now + 600,
        kind: TokenKind::Access,
        email: None,
        username: None,
    };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::new(harness.config.algorithm),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(&harness.config.signing_secret),
    )
    .unwrap();

    let err = harness.resolver().execute(&token).await.unwrap_err();
    assert!(matches!(err, IdentityError::MalformedSubject));
}

#[tokio::test]
async fn test_resolver_store_failure_is_retryable() {
    let harness = Harness::new();
    let user = harness.register_default_user().await;
    let pair = harness.tokens.issue(&user).unwrap();

    harness.repo.set_failing(true);

    let err = harness
        .resolver()
        .execute(&pair.access_token)
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::Database(_)));
    assert!(err.kind().is_server_error());

    // Store recovery makes the same token resolve again: the failure was
    // never an authentication verdict.
    harness.repo.set_failing(false);
    assert!(harness.resolver().execute(&pair.access_token).await.is_ok());
}
