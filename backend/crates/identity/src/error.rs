//! Identity Error Types
//!
//! This module provides identity-specific error variants that integrate
//! with the unified `kernel::error::AppError` system. Every decode or
//! verification failure resolves to one of these typed values; nothing in
//! the request path panics, and no message carries credential material.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::application::token::TokenError;

/// Identity-specific result type alias
pub type IdentityResult<T> = Result<T, IdentityError>;

/// Identity-specific error variants
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Malformed input: bad identifier text, invalid email, weak password
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Email or username already registered
    #[error("Email or username already registered")]
    Conflict,

    /// Wrong credentials. Deliberately vague: the caller cannot tell an
    /// unknown identifier from a wrong password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account exists but is deactivated
    #[error("Account is inactive")]
    AccountInactive,

    /// Token failed verification (expired, bad signature, wrong kind, ...)
    #[error("Token verification failed: {0}")]
    Token(#[from] TokenError),

    /// Token subject was not a decodable canonical identifier. Should not
    /// occur when issuance is correct, but is handled rather than assumed.
    #[error("Token subject is not a valid identifier")]
    MalformedSubject,

    /// No identity record for the resolved identifier
    #[error("User not found")]
    UserNotFound,

    /// External store failure. Retryable by the caller, unlike every 4xx
    /// variant above.
    #[error("Identity store error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::Validation(_) => StatusCode::BAD_REQUEST,
            IdentityError::Conflict => StatusCode::CONFLICT,
            IdentityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            IdentityError::AccountInactive => StatusCode::FORBIDDEN,
            IdentityError::Token(TokenError::Signing) => StatusCode::INTERNAL_SERVER_ERROR,
            IdentityError::Token(_) | IdentityError::MalformedSubject => StatusCode::UNAUTHORIZED,
            IdentityError::UserNotFound => StatusCode::NOT_FOUND,
            IdentityError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            IdentityError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IdentityError::Validation(_) => ErrorKind::BadRequest,
            IdentityError::Conflict => ErrorKind::Conflict,
            IdentityError::InvalidCredentials => ErrorKind::Unauthorized,
            IdentityError::AccountInactive => ErrorKind::Forbidden,
            IdentityError::Token(TokenError::Signing) => ErrorKind::InternalServerError,
            IdentityError::Token(_) | IdentityError::MalformedSubject => ErrorKind::Unauthorized,
            IdentityError::UserNotFound => ErrorKind::NotFound,
            IdentityError::Database(_) => ErrorKind::ServiceUnavailable,
            IdentityError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            IdentityError::Database(e) => {
                tracing::error!(error = %e, "Identity store error");
            }
            IdentityError::Internal(msg) => {
                tracing::error!(message = %msg, "Identity internal error");
            }
            IdentityError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            IdentityError::AccountInactive => {
                tracing::warn!("Login or session attempt on inactive account");
            }
            IdentityError::MalformedSubject => {
                tracing::warn!("Verified token carried an undecodable subject");
            }
            _ => {
                tracing::debug!(error = %self, "Identity error");
            }
        }
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for IdentityError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest | ErrorKind::UnprocessableEntity => {
                IdentityError::Validation(err.message().to_string())
            }
            ErrorKind::Conflict => IdentityError::Conflict,
            _ => IdentityError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            IdentityError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(IdentityError::Conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            IdentityError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            IdentityError::AccountInactive.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            IdentityError::UserNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            IdentityError::Token(TokenError::Expired).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            IdentityError::MalformedSubject.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_lookup_failures_are_retryable() {
        let err = IdentityError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(err.kind().is_server_error());
    }

    #[test]
    fn test_token_kinds_stay_unauthorized() {
        for token_err in [
            TokenError::Expired,
            TokenError::SignatureInvalid,
            TokenError::Malformed,
            TokenError::WrongTokenKind {
                expected: crate::application::token::TokenKind::Access,
                actual: crate::application::token::TokenKind::Refresh,
            },
        ] {
            assert_eq!(
                IdentityError::Token(token_err).kind(),
                ErrorKind::Unauthorized
            );
        }
    }
}
