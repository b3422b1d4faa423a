//! User service
//!
//! Registration and lookup of the people who share expenses. Users are never
//! deleted because expenses keep referring to them.

use crate::error::{ShareError, ShareResult};
use crate::models::{User, UserId};
use crate::storage::Storage;

/// Service for user management
pub struct UserService<'a> {
    storage: &'a Storage,
}

impl<'a> UserService<'a> {
    /// Create a new user service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a new user
    pub fn register(
        &self,
        username: &str,
        email: Option<&str>,
        mobile_number: &str,
    ) -> ShareResult<User> {
        let username = username.trim();

        if self.storage.users.get_by_username(username)?.is_some() {
            return Err(ShareError::Duplicate {
                entity_type: "User",
                identifier: username.to_string(),
            });
        }

        let user = User::with_email(
            username,
            email.map(str::trim).unwrap_or_default(),
            mobile_number.trim(),
        );

        user.validate()
            .map_err(|e| ShareError::Validation(e.to_string()))?;

        self.storage.users.upsert(user.clone())?;
        if let Err(e) = self.storage.users.save() {
            tracing::error!(username = %user.username, error = %e, "save failed, registration undone");
            self.storage.users.remove(user.id)?;
            return Err(e);
        }

        tracing::info!(user_id = %user.id, username = %user.username, "registered user");

        Ok(user)
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> ShareResult<Option<User>> {
        self.storage.users.get(id)
    }

    /// Get a user by ID, failing if it does not exist
    pub fn require(&self, id: UserId) -> ShareResult<User> {
        self.get(id)?
            .ok_or_else(|| ShareError::user_not_found(id.to_string()))
    }

    /// Find a user by username, full UUID, or short `usr-` ID
    pub fn find(&self, identifier: &str) -> ShareResult<Option<User>> {
        let identifier = identifier.trim();

        if let Some(user) = self.storage.users.get_by_username(identifier)? {
            return Ok(Some(user));
        }

        if let Ok(id) = identifier.parse::<UserId>() {
            return self.storage.users.get(id);
        }

        // Short display form, only if it is unambiguous
        let mut matches = self
            .storage
            .users
            .get_all()?
            .into_iter()
            .filter(|u| u.id.matches_prefix(identifier));
        match (matches.next(), matches.next()) {
            (Some(user), None) => Ok(Some(user)),
            _ => Ok(None),
        }
    }

    /// Resolve a user reference or fail with `NotFound`
    pub fn resolve(&self, identifier: &str) -> ShareResult<User> {
        self.find(identifier)?
            .ok_or_else(|| ShareError::user_not_found(identifier))
    }

    /// List all users ordered by username
    pub fn list(&self) -> ShareResult<Vec<User>> {
        self.storage.users.get_all()
    }

    /// Count users
    pub fn count(&self) -> ShareResult<usize> {
        self.storage.users.count()
    }
}
