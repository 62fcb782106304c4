//! API DTOs (Data Transfer Objects)
//!
//! Wire shapes are snake_case; token fields follow the OAuth2 bearer-token
//! vocabulary (`access_token`, `refresh_token`, `token_type`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::authenticate::AuthenticateOutput;
use crate::domain::entity::user::User;

// ============================================================================
// Register
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Public user representation
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    /// Canonical identifier, hyphenated textual form
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            email: user.email.as_str().to_string(),
            username: user.username.as_str().to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.clone(),
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

// ============================================================================
// Login / Refresh
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Email or username
    pub email_or_username: String,
    pub password: String,
}

/// Refresh request
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair response
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

impl From<&AuthenticateOutput> for TokenResponse {
    fn from(output: &AuthenticateOutput) -> Self {
        Self {
            access_token: output.tokens.access_token.clone(),
            refresh_token: output.tokens.refresh_token.clone(),
            token_type: "bearer",
            expires_at: output.tokens.access_expires_at,
            user: UserResponse::from(&output.user),
        }
    }
}
