//! Application Configuration
//!
//! Immutable configuration for the identity subsystem, constructed once at
//! process start and passed into each component. Nothing reads ambient
//! globals, so tests can run isolated instances with distinct secrets and
//! lifetimes.

use std::time::Duration;

use jsonwebtoken::Algorithm;
use platform::password::{CredentialHasher, CredentialParams};
use thiserror::Error;

/// Startup configuration error. Always fatal: the process must not serve
/// requests with a broken identity configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Signing secret must not be empty")]
    EmptySigningSecret,

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token lifetimes must be non-zero")]
    ZeroTokenLifetime,

    #[error("Access lifetime must be shorter than refresh lifetime")]
    LifetimeOrder,

    #[error("Invalid credential hashing parameters: {0}")]
    InvalidCredentialParams(String),
}

/// Identity application configuration
#[derive(Clone)]
pub struct IdentityConfig {
    /// Shared secret for token signing
    pub signing_secret: Vec<u8>,
    /// Signing algorithm (HS256, HS384, or HS512)
    pub algorithm: Algorithm,
    /// Token issuer claim
    pub issuer: String,
    /// Token audience claim
    pub audience: String,
    /// Access token lifetime (minutes-scale)
    pub access_ttl: Duration,
    /// Refresh token lifetime (days-scale)
    pub refresh_ttl: Duration,
    /// Credential hashing policy and cost parameters
    pub credential: CredentialParams,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            signing_secret: Vec::new(),
            algorithm: Algorithm::HS256,
            issuer: "FinTrack".to_string(),
            audience: "FinTrack".to_string(),
            access_ttl: Duration::from_secs(30 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),
            credential: CredentialParams::default(),
        }
    }
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("credential", &self.credential)
            .finish()
    }
}

impl IdentityConfig {
    /// Create config with a random signing secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = vec![0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            signing_secret: secret,
            ..Default::default()
        }
    }

    /// Development configuration: random secret, cheap hashing so test
    /// suites stay fast. Never use the cheap parameters in production.
    pub fn development() -> Self {
        Self {
            credential: CredentialParams {
                time_cost: 2,
                memory_cost_kib: 19 * 1024,
                parallelism: 1,
                ..CredentialParams::default()
            },
            ..Self::with_random_secret()
        }
    }

    /// Parse an algorithm name from configuration.
    ///
    /// Only the HMAC family is accepted; the shared-secret key shape rules
    /// out asymmetric algorithms.
    pub fn parse_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
        match name {
            "HS256" => Ok(Algorithm::HS256),
            "HS384" => Ok(Algorithm::HS384),
            "HS512" => Ok(Algorithm::HS512),
            other => Err(ConfigError::UnsupportedAlgorithm(other.to_string())),
        }
    }

    /// Validate the configuration. Call at startup; any error aborts the
    /// process instead of surfacing per-request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing_secret.is_empty() {
            return Err(ConfigError::EmptySigningSecret);
        }

        if !matches!(
            self.algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(ConfigError::UnsupportedAlgorithm(format!(
                "{:?}",
                self.algorithm
            )));
        }

        if self.access_ttl.is_zero() || self.refresh_ttl.is_zero() {
            return Err(ConfigError::ZeroTokenLifetime);
        }
        if self.access_ttl >= self.refresh_ttl {
            return Err(ConfigError::LifetimeOrder);
        }

        CredentialHasher::new(self.credential.clone())
            .map_err(|e| ConfigError::InvalidCredentialParams(e.to_string()))?;

        Ok(())
    }

    /// Access token lifetime in whole seconds
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.as_secs() as i64
    }

    /// Refresh token lifetime in whole seconds
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl.as_secs() as i64
    }
}
