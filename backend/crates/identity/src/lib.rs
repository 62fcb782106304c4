//! Identity & Token Authentication Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - User registration with email + username + password
//! - Login with either identifier, returning an access/refresh token pair
//! - Stateless signed tokens (JWT, HS-family) with distinct access and
//!   refresh semantics
//! - Bearer-token session resolution into the caller's identity record
//!
//! ## Security Model
//! - Passwords hashed with Argon2id under one deployment-wide parameter set
//! - Tokens carry the canonical identifier in textual form; the binary form
//!   never leaves the store boundary
//! - Wrong credentials and unknown identifiers produce the same vague error
//! - Nothing sensitive (plaintext, hash strings, signing secret) is logged

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::{ConfigError, IdentityConfig};
pub use application::token::{TokenClaims, TokenError, TokenKind, TokenPair, TokenService};
pub use error::{IdentityError, IdentityResult};
pub use infra::postgres::PgIdentityRepository;
pub use presentation::router::identity_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
