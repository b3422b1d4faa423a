//! User model
//!
//! A user is a stable identity plus contact details. Balances are always
//! computed between pairs of users, so the identity never changes once
//! created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::UserId;

/// Maximum username length
pub const MAX_USERNAME_LEN: usize = 150;

/// Maximum mobile number length
pub const MAX_MOBILE_LEN: usize = 15;

/// A participant in shared expenses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Login-style handle, unique case-insensitively
    pub username: String,

    /// Contact email
    #[serde(default)]
    pub email: String,

    /// Contact mobile number
    pub mobile_number: String,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last modified
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(username: impl Into<String>, mobile_number: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            username: username.into(),
            email: String::new(),
            mobile_number: mobile_number.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new user with an email address
    pub fn with_email(
        username: impl Into<String>,
        email: impl Into<String>,
        mobile_number: impl Into<String>,
    ) -> Self {
        let mut user = Self::new(username, mobile_number);
        user.email = email.into();
        user
    }

    /// Normalize a username for case-insensitive lookup
    pub fn normalize_username(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Validate the user
    pub fn validate(&self) -> Result<(), UserValidationError> {
        let username = self.username.trim();
        if username.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        let username_len = username.chars().count();
        if username_len > MAX_USERNAME_LEN {
            return Err(UserValidationError::UsernameTooLong(username_len));
        }

        let mobile = self.mobile_number.trim();
        if mobile.is_empty() {
            return Err(UserValidationError::EmptyMobile);
        }
        let mobile_len = mobile.chars().count();
        if mobile_len > MAX_MOBILE_LEN {
            return Err(UserValidationError::MobileTooLong(mobile_len));
        }
        let digits = mobile.strip_prefix('+').unwrap_or(mobile);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(UserValidationError::InvalidMobile(mobile.to_string()));
        }

        if !self.email.is_empty() && !self.email.contains('@') {
            return Err(UserValidationError::InvalidEmail(self.email.clone()));
        }

        Ok(())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// Validation errors for users
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooLong(usize),
    EmptyMobile,
    MobileTooLong(usize),
    InvalidMobile(String),
    InvalidEmail(String),
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "Username cannot be empty"),
            Self::UsernameTooLong(len) => write!(
                f,
                "Username too long ({} chars, max {})",
                len, MAX_USERNAME_LEN
            ),
            Self::EmptyMobile => write!(f, "Mobile number cannot be empty"),
            Self::MobileTooLong(len) => write!(
                f,
                "Mobile number too long ({} chars, max {})",
                len, MAX_MOBILE_LEN
            ),
            Self::InvalidMobile(m) => write!(f, "Mobile number must contain only digits: {}", m),
            Self::InvalidEmail(e) => write!(f, "Invalid email address: {}", e),
        }
    }
}

impl std::error::Error for UserValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = User::new("alice", "1234567890");
        assert_eq!(user.username, "alice");
        assert!(user.email.is_empty());
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            User::new("  ", "123").validate(),
            Err(UserValidationError::EmptyUsername)
        );
        assert_eq!(
            User::new("bob", "").validate(),
            Err(UserValidationError::EmptyMobile)
        );
        assert_eq!(
            User::new("bob", "1234567890123456").validate(),
            Err(UserValidationError::MobileTooLong(16))
        );
        assert!(matches!(
            User::new("bob", "555-1234").validate(),
            Err(UserValidationError::InvalidMobile(_))
        ));
        assert!(User::new("bob", "+441234567890").validate().is_ok());
        assert!(matches!(
            User::with_email("bob", "not-an-email", "123").validate(),
            Err(UserValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_username_limit_counts_characters() {
        // 150 three-byte characters
        let name = "名".repeat(MAX_USERNAME_LEN);
        assert!(User::new(name, "123").validate().is_ok());

        let name = "名".repeat(MAX_USERNAME_LEN + 1);
        assert_eq!(
            User::new(name, "123").validate(),
            Err(UserValidationError::UsernameTooLong(MAX_USERNAME_LEN + 1))
        );
    }

    #[test]
    fn test_normalize_username() {
        assert_eq!(User::normalize_username("  Alice "), "alice");
    }
}
