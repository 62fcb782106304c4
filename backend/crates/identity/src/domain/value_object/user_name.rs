//! UserName Value Object
//!
//! Login/display handle: 3-20 characters, ASCII alphanumerics and
//! underscore, stored lowercase so lookups are case-insensitive.

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

const MIN_LENGTH: usize = 3;
const MAX_LENGTH: usize = 20;

/// Username value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    /// Validate, trim, and lowercase a username.
    pub fn new(raw: impl Into<String>) -> AppResult<Self> {
        let name = raw.into().trim().to_lowercase();

        if name.len() < MIN_LENGTH || name.len() > MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Username must be {}-{} characters",
                MIN_LENGTH, MAX_LENGTH
            )));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AppError::bad_request(
                "Username may contain only letters, digits, and underscores",
            ));
        }

        Ok(Self(name))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_db(self) -> String {
        self.0
    }
}

impl FromStr for UserName {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        UserName::new(s)
    }
}

impl std::fmt::Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_usernames() {
        assert!(UserName::new("abc").is_ok());
        assert!(UserName::new("user_42").is_ok());
        assert_eq!(UserName::new("Alice").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_length_bounds() {
        assert!(UserName::new("ab").is_err());
        assert!(UserName::new("a".repeat(21)).is_err());
        assert!(UserName::new("a".repeat(20)).is_ok());
    }

    #[test]
    fn test_character_set() {
        assert!(UserName::new("bad name").is_err());
        assert!(UserName::new("bad-name").is_err());
        assert!(UserName::new("bad!").is_err());
        assert!(UserName::new("名前です").is_err());
    }
}
