//! User Entity
//!
//! The identity record: profile fields plus the stored credential hash and
//! the active flag. The canonical identifier is produced once at
//! registration and never changes; the credential is replaced wholesale on
//! password change, never mutated in place.

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::CredentialHash;

use crate::domain::value_object::{email::Email, user_name::UserName};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Canonical 16-byte identifier (typed)
    pub user_id: UserId,
    /// Email address (unique, lowercased)
    pub email: Email,
    /// Username (unique, lowercased)
    pub username: UserName,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Phone number, digits only (optional)
    pub phone_number: Option<String>,
    /// Preferred currency code (ISO 4217)
    pub currency: String,
    /// Stored credential (PHC hash string)
    pub credential: CredentialHash,
    /// Whether the account may authenticate and hold sessions
    pub is_active: bool,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

/// Default currency for new accounts
const DEFAULT_CURRENCY: &str = "ETB";

impl User {
    /// Create a new active user at registration time.
    pub fn new(
        email: Email,
        username: UserName,
        first_name: String,
        last_name: String,
        phone_number: Option<String>,
        credential: CredentialHash,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            username,
            first_name,
            last_name,
            phone_number,
            currency: DEFAULT_CURRENCY.to_string(),
            credential,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record successful login
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Replace the stored credential (password change).
    pub fn replace_credential(&mut self, credential: CredentialHash) {
        self.credential = credential;
        self.updated_at = Utc::now();
    }

    /// Deactivate the account. Sessions already issued keep verifying until
    /// their tokens expire; resolution rejects them at the active check.
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }
}
