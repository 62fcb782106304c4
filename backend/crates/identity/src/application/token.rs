//! Token Service
//!
//! Issues and verifies the signed session tokens (compact JWS:
//! `header.claims.signature`, base64url segments). Access and refresh
//! tokens share issuer, audience, and signing secret; they differ in the
//! `type` claim and lifetime. Issuance is a pure function of the input
//! claims, the clock, and the configuration; nothing is persisted, so a
//! token cannot be revoked before its expiry.
//!
//! The service holds only read-only state after construction and is safe to
//! share across concurrent requests without locks.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind as JwtErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::config::IdentityConfig;
use crate::domain::entity::user::User;

// ============================================================================
// Token kinds and claims
// ============================================================================

/// Which of the two token roles a token plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived proof of identity for ordinary API calls
    Access,
    /// Long-lived token accepted only for obtaining a new pair
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        };
        write!(f, "{}", s)
    }
}

/// Claims embedded in every token.
///
/// The subject is the canonical identifier's textual (hyphenated) form, so
/// verification never touches the binary representation. Access tokens
/// additionally denormalize email and username for display without a second
/// lookup. Once signed, claims are immutable; only a new token can change
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: canonical identifier text
    pub sub: String,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued-at (epoch seconds)
    pub iat: i64,
    /// Expiry (epoch seconds, strictly greater than iat)
    pub exp: i64,
    /// Token role
    #[serde(rename = "type")]
    pub kind: TokenKind,
    /// Denormalized email (access tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Denormalized username (access tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Result of issuance: the pair plus the access expiry for the response
/// body.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub access_expires_at: DateTime<Utc>,
}

// ============================================================================
// Errors
// ============================================================================

/// Token verification/issuance failure.
///
/// Each check failure is distinct so callers can message appropriately: a
/// refresh token presented where an access token is expected is
/// `WrongTokenKind`, not a signature or expiry problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Not a parseable compact JWS
    #[error("token is malformed")]
    Malformed,

    /// Signature did not verify under the configured secret/algorithm
    #[error("token signature is invalid")]
    SignatureInvalid,

    /// Issuer claim does not match configuration
    #[error("token issuer mismatch")]
    IssuerMismatch,

    /// Audience claim does not match configuration
    #[error("token audience mismatch")]
    AudienceMismatch,

    /// Expiry has passed
    #[error("token has expired")]
    Expired,

    /// Valid token of the wrong role
    #[error("wrong token kind: expected {expected}, got {actual}")]
    WrongTokenKind {
        expected: TokenKind,
        actual: TokenKind,
    },

    /// Signing failed at issuance (configuration-level, not caller input)
    #[error("token could not be signed")]
    Signing,
}

// ============================================================================
// Service
// ============================================================================

/// Issues and verifies session tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    issuer: String,
    audience: String,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    /// Build from validated configuration.
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(&config.signing_secret),
            decoding_key: DecodingKey::from_secret(&config.signing_secret),
            header: Header::new(config.algorithm),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            access_ttl_secs: config.access_ttl_secs(),
            refresh_ttl_secs: config.refresh_ttl_secs(),
        }
    }

    /// Mint an access/refresh pair for a user at the current time.
    pub fn issue(&self, user: &User) -> Result<TokenPair, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Mint an access/refresh pair against an explicit clock.
    ///
    /// Both tokens get the same `iat`; lifetimes come from configuration,
    /// so `exp > iat` always holds.
    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        let iat = now.timestamp();
        let sub = user.user_id.to_string();

        let access = TokenClaims {
            sub: sub.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            exp: iat + self.access_ttl_secs,
            kind: TokenKind::Access,
            email: Some(user.email.as_str().to_string()),
            username: Some(user.username.as_str().to_string()),
        };

        let refresh = TokenClaims {
            sub,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat,
            exp: iat + self.refresh_ttl_secs,
            kind: TokenKind::Refresh,
            email: None,
            username: None,
        };

        let access_token =
            encode(&self.header, &access, &self.encoding_key).map_err(|_| TokenError::Signing)?;
        let refresh_token =
            encode(&self.header, &refresh, &self.encoding_key).map_err(|_| TokenError::Signing)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at: now + Duration::seconds(self.access_ttl_secs),
        })
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, expected, Utc::now())
    }

    /// Verify a token against an explicit clock.
    ///
    /// Checks in order: signature, issuer, audience, expiry, kind. Each
    /// failure maps to its own [`TokenError`] variant; nothing panics on
    /// malformed input.
    pub fn verify_at(
        &self,
        token: &str,
        expected: TokenKind,
        now: DateTime<Utc>,
    ) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(self.header.alg);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        // Expiry is checked below against the caller's clock
        validation.validate_exp = false;

        let data = decode::<TokenClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
                    TokenError::SignatureInvalid
                }
                JwtErrorKind::InvalidIssuer => TokenError::IssuerMismatch,
                JwtErrorKind::InvalidAudience => TokenError::AudienceMismatch,
                _ => TokenError::Malformed,
            }
        })?;

        let claims = data.claims;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        if claims.kind != expected {
            return Err(TokenError::WrongTokenKind {
                expected,
                actual: claims.kind,
            });
        }

        Ok(claims)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::{email::Email, user_name::UserName};
    use platform::password::CredentialHash;

    fn test_user() -> User {
        User::new(
            Email::new("a@example.com").unwrap(),
            UserName::new("alice").unwrap(),
            "Alice".to_string(),
            "Example".to_string(),
            None,
            CredentialHash::from_storage("$argon2id$placeholder"),
        )
    }

    fn service() -> TokenService {
        TokenService::new(&IdentityConfig::with_random_secret())
    }

    #[test]
    fn test_fresh_access_token_verifies() {
        let service = service();
        let user = test_user();
        let pair = service.issue(&user).unwrap();

        let claims = service.verify(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, user.user_id.to_string());
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.iss, "FinTrack");
        assert_eq!(claims.aud, "FinTrack");
    }

    #[test]
    fn test_wire_format_is_three_segments() {
        let pair = service().issue(&test_user()).unwrap();
        assert_eq!(pair.access_token.split('.').count(), 3);
        assert_eq!(pair.refresh_token.split('.').count(), 3);
    }

    #[test]
    fn test_access_token_denormalizes_identity() {
        let service = service();
        let user = test_user();
        let pair = service.issue(&user).unwrap();

        let access = service.verify(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(access.email.as_deref(), Some("a@example.com"));
        assert_eq!(access.username.as_deref(), Some("alice"));

        let refresh = service
            .verify(&pair.refresh_token, TokenKind::Refresh)
            .unwrap();
        assert!(refresh.email.is_none());
        assert!(refresh.username.is_none());
    }

    #[test]
    fn test_expiry_strictly_after_issuance() {
        let service = service();
        let now = Utc::now();
        let pair = service.issue_at(&test_user(), now).unwrap();

        let access = service
            .verify_at(&pair.access_token, TokenKind::Access, now)
            .unwrap();
        assert!(access.exp > access.iat);
        assert_eq!(access.exp - access.iat, 30 * 60);

        let refresh = service
            .verify_at(&pair.refresh_token, TokenKind::Refresh, now)
            .unwrap();
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 3600);
    }

    #[test]
    fn test_access_token_expires() {
        let service = service();
        let now = Utc::now();
        let pair = service.issue_at(&test_user(), now).unwrap();

        // Still valid one minute before the 30-minute lifetime ends.
        assert!(
            service
                .verify_at(&pair.access_token, TokenKind::Access, now + Duration::minutes(29))
                .is_ok()
        );

        // 31 minutes later it is gone.
        let err = service
            .verify_at(&pair.access_token, TokenKind::Access, now + Duration::minutes(31))
            .unwrap_err();
        assert_eq!(err, TokenError::Expired);

        // The refresh token is unaffected at that point.
        assert!(
            service
                .verify_at(&pair.refresh_token, TokenKind::Refresh, now + Duration::minutes(31))
                .is_ok()
        );
    }

    #[test]
    fn test_refresh_rejected_where_access_expected() {
        let service = service();
        let pair = service.issue(&test_user()).unwrap();

        let err = service
            .verify(&pair.refresh_token, TokenKind::Access)
            .unwrap_err();
        assert_eq!(
            err,
            TokenError::WrongTokenKind {
                expected: TokenKind::Access,
                actual: TokenKind::Refresh,
            }
        );

        // And the other way around.
        let err = service
            .verify(&pair.access_token, TokenKind::Refresh)
            .unwrap_err();
        assert!(matches!(err, TokenError::WrongTokenKind { .. }));
    }

    #[test]
    fn test_foreign_secret_fails_signature() {
        let issuing = service();
        let verifying = service(); // different random secret
        let pair = issuing.issue(&test_user()).unwrap();

        let err = verifying
            .verify(&pair.access_token, TokenKind::Access)
            .unwrap_err();
        assert_eq!(err, TokenError::SignatureInvalid);
    }

    #[test]
    fn test_tampered_payload_fails_signature() {
        let service = service();
        let pair = service.issue(&test_user()).unwrap();

        // Flip one character inside the claims segment.
        let mut parts: Vec<String> = pair
            .access_token
            .split('.')
            .map(|s| s.to_string())
            .collect();
        let mut payload: Vec<u8> = parts[1].clone().into_bytes();
        payload[10] = if payload[10] == b'A' { b'B' } else { b'A' };
        parts[1] = String::from_utf8(payload).unwrap();
        let tampered = parts.join(".");

        let err = service.verify(&tampered, TokenKind::Access).unwrap_err();
        assert!(matches!(
            err,
            TokenError::SignatureInvalid | TokenError::Malformed
        ));
    }

    #[test]
    fn test_issuer_and_audience_must_match() {
        let mut config = IdentityConfig::with_random_secret();
        config.issuer = "OtherIssuer".to_string();
        let foreign_issuer = TokenService::new(&config);

        let mut shared = IdentityConfig::with_random_secret();
        shared.signing_secret = config.signing_secret.clone();
        let ours = TokenService::new(&shared);

        let pair = foreign_issuer.issue(&test_user()).unwrap();
        let err = ours.verify(&pair.access_token, TokenKind::Access).unwrap_err();
        assert_eq!(err, TokenError::IssuerMismatch);

        let mut aud_config = IdentityConfig::with_random_secret();
        aud_config.signing_secret = shared.signing_secret.clone();
        aud_config.audience = "OtherAudience".to_string();
        let foreign_audience = TokenService::new(&aud_config);

        let pair = foreign_audience.issue(&test_user()).unwrap();
        let err = ours.verify(&pair.access_token, TokenKind::Access).unwrap_err();
        assert_eq!(err, TokenError::AudienceMismatch);
    }

    #[test]
    fn test_garbage_input_is_malformed() {
        let service = service();
        for garbage in ["", "not-a-token", "a.b", "a.b.c.d"] {
            let err = service.verify(garbage, TokenKind::Access).unwrap_err();
            assert_eq!(err, TokenError::Malformed, "input: {:?}", garbage);
        }
    }
}
