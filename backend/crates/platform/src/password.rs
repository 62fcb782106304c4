//! Credential Hashing and Verification
//!
//! Argon2id password handling for the identity subsystem:
//! - One canonical parameter set per deployment, supplied by configuration
//! - Self-describing PHC hash strings (algorithm, version, params, salt)
//! - Zeroization of plaintext material
//! - Constant-time digest comparison
//!
//! Parameters are embedded in every stored hash, so changing the deployment
//! configuration never invalidates existing credentials: old hashes verify
//! with their own parameters and [`CredentialHasher::needs_rehash`] reports
//! the drift.

use std::fmt;

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Parameters
// ============================================================================

/// Cost and policy parameters for credential hashing.
///
/// Fixed at process start; callers never supply their own. Exactly one
/// configuration exists per deployment so every credential carries uniform
/// work factors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialParams {
    /// Argon2 iterations (time cost)
    pub time_cost: u32,
    /// Memory cost in KiB
    pub memory_cost_kib: u32,
    /// Degree of parallelism
    pub parallelism: u32,
    /// Digest length in bytes
    pub output_len: usize,
    /// Minimum accepted password length (Unicode code points)
    pub min_length: usize,
    /// Maximum accepted password length
    pub max_length: usize,
}

impl Default for CredentialParams {
    fn default() -> Self {
        Self {
            time_cost: 3,
            memory_cost_kib: 64 * 1024,
            parallelism: 4,
            output_len: 32,
            min_length: 8,
            max_length: 128,
        }
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation (the caller's input was too weak to hash).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    /// Password is empty or whitespace only
    #[error("Password cannot be empty")]
    Empty,

    /// Password is shorter than the configured minimum
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    /// Password exceeds the configured maximum
    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Password contains control characters
    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Hashing failure (configuration or algorithm level, never input level).
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// The configured cost parameters are out of the algorithm's range
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

// ============================================================================
// Plain Password (zeroized on drop)
// ============================================================================

/// Plaintext password with automatic memory zeroization.
///
/// Validated against the deployment policy at construction, NFKC-normalized
/// first so visually identical Unicode input hashes identically. Does not
/// implement `Clone`; `Debug` output is redacted. The plaintext never
/// reaches storage, logs, or error messages.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PlainPassword(String);

impl PlainPassword {
    /// Validate and wrap a raw password.
    ///
    /// Policy: non-empty after trimming, within `[min_length, max_length]`
    /// code points, no control characters (space, tab, and newline are
    /// allowed). Violations return [`PasswordPolicyError`].
    pub fn new(raw: String, params: &CredentialParams) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::Empty);
        }

        // Length in Unicode code points, not bytes
        let char_count = normalized.chars().count();

        if char_count < params.min_length {
            return Err(PasswordPolicyError::TooShort {
                min: params.min_length,
                actual: char_count,
            });
        }

        if char_count > params.max_length {
            return Err(PasswordPolicyError::TooLong {
                max: params.max_length,
                actual: char_count,
            });
        }

        if normalized
            .chars()
            .any(|ch| ch.is_control() && ch != ' ' && ch != '\t' && ch != '\n')
        {
            return Err(PasswordPolicyError::InvalidCharacter);
        }

        Ok(Self(normalized))
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for PlainPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PlainPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Credential Hash (safe to store)
// ============================================================================

/// Stored credential in PHC string format.
///
/// The string embeds algorithm identifier, version, cost parameters, salt,
/// and digest, so verification is self-describing. Construction performs no
/// validation: malformed values loaded from storage simply fail
/// verification instead of failing the request.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wrap a value loaded from storage.
    pub fn from_storage(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The PHC string for persistence.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHash")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Credential Hasher
// ============================================================================

/// The deployment's single credential hashing facility.
///
/// Read-only after construction; safe to share across request handlers.
/// Hashing is CPU- and memory-bound by design (tens of milliseconds) and
/// belongs on a blocking worker pool, not a request-accepting thread.
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    params: CredentialParams,
}

impl CredentialHasher {
    /// Build from the configured parameters.
    ///
    /// Fails only when the cost parameters are outside Argon2's accepted
    /// ranges; that is a configuration bug and should abort startup.
    pub fn new(params: CredentialParams) -> Result<Self, PasswordHashError> {
        let argon2_params = Params::new(
            params.memory_cost_kib,
            params.time_cost,
            params.parallelism,
            Some(params.output_len),
        )
        .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params),
            params,
        })
    }

    pub fn params(&self) -> &CredentialParams {
        &self.params
    }

    /// Hash a validated password with a fresh random salt.
    ///
    /// Two calls with the same password produce different strings; the salt
    /// is generated per call from the OS entropy source.
    pub fn hash(&self, password: &PlainPassword) -> Result<CredentialHash, PasswordHashError> {
        let salt = SaltString::generate(OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(CredentialHash(hash.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Cost parameters are read from the stored string, so credentials
    /// hashed under an older configuration still verify. The digest
    /// comparison is constant-time. Malformed stored strings return
    /// `false`, never an error.
    pub fn verify(&self, password: &PlainPassword, stored: &CredentialHash) -> bool {
        let parsed = match PasswordHash::new(stored.as_str()) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Whether a stored hash was produced under different parameters than
    /// the current configuration (candidate for rehash on next login).
    pub fn needs_rehash(&self, stored: &CredentialHash) -> bool {
        let parsed = match PasswordHash::new(stored.as_str()) {
            Ok(h) => h,
            Err(_) => return true,
        };

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }

        let stored_params = match Params::try_from(&parsed) {
            Ok(p) => p,
            Err(_) => return true,
        };

        stored_params.m_cost() != self.params.memory_cost_kib
            || stored_params.t_cost() != self.params.time_cost
            || stored_params.p_cost() != self.params.parallelism
    }
}

// ============================================================================
// Tests
// ============================================================================
