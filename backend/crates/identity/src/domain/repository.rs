//! Repository Trait
//!
//! Interface to the external identity store. Implementation is in the
//! infrastructure layer; tests use an in-memory stand-in. The store owns
//! and serializes the only shared mutable state (the user row); nothing in
//! this subsystem holds locks around it.

use crate::domain::entity::user::User;
use crate::domain::value_object::{email::Email, user_name::UserName};
use crate::error::IdentityResult;
use kernel::id::UserId;

/// Identity store trait
#[trait_variant::make(IdentityRepository: Send)]
pub trait LocalIdentityRepository {
    /// Persist a new user
    async fn create(&self, user: &User) -> IdentityResult<()>;

    /// Find user by canonical identifier
    async fn find_by_id(&self, user_id: &UserId) -> IdentityResult<Option<User>>;

    /// Find user by email or username (already lowercased by the caller)
    async fn find_by_email_or_username(&self, identifier: &str) -> IdentityResult<Option<User>>;

    /// Check whether either the email or the username is taken
    async fn exists_by_email_or_username(
        &self,
        email: &Email,
        username: &UserName,
    ) -> IdentityResult<bool>;

    /// Update an existing user
    async fn update(&self, user: &User) -> IdentityResult<()>;
}
