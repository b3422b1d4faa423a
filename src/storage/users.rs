//! User repository for JSON storage
//!
//! Manages loading and saving users to users.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::ShareError;
use crate::models::{User, UserId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable user data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct UserData {
    users: Vec<User>,
}

/// Repository for user persistence
pub struct UserRepository {
    path: PathBuf,
    data: RwLock<HashMap<UserId, User>>,
    /// Index: normalized username -> user_id
    by_username: RwLock<HashMap<String, UserId>>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_username: RwLock::new(HashMap::new()),
        }
    }

    /// Load users from disk
    pub fn load(&self) -> Result<(), ShareError> {
        let file_data: UserData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_username = self
            .by_username
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_username.clear();

        for user in file_data.users {
            by_username.insert(User::normalize_username(&user.username), user.id);
            data.insert(user.id, user);
        }

        Ok(())
    }

    /// Save users to disk
    pub fn save(&self) -> Result<(), ShareError> {
        let users = self.get_all()?;
        write_json_atomic(&self.path, &UserData { users })
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> Result<Option<User>, ShareError> {
        let data = self
            .data
            .read()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all users, ordered by username
    pub fn get_all(&self) -> Result<Vec<User>, ShareError> {
        let data = self
            .data
            .read()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut users: Vec<_> = data.values().cloned().collect();
        users.sort_by(|a, b| {
            User::normalize_username(&a.username)
                .cmp(&User::normalize_username(&b.username))
                .then(a.id.cmp(&b.id))
        });
        Ok(users)
    }

    /// Get a user by username (case-insensitive)
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>, ShareError> {
        let data = self
            .data
            .read()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_username = self
            .by_username
            .read()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(by_username
            .get(&User::normalize_username(username))
            .and_then(|id| data.get(id).cloned()))
    }

    /// Insert or update a user
    pub fn upsert(&self, user: User) -> Result<(), ShareError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_username = self
            .by_username
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(old) = data.get(&user.id) {
            by_username.remove(&User::normalize_username(&old.username));
        }
        by_username.insert(User::normalize_username(&user.username), user.id);

        data.insert(user.id, user);
        Ok(())
    }

    /// Replace every user in memory, rebuilding the username index
    pub fn replace_all(&self, users: Vec<User>) -> Result<(), ShareError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_username = self
            .by_username
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_username.clear();

        for user in users {
            by_username.insert(User::normalize_username(&user.username), user.id);
            data.insert(user.id, user);
        }

        Ok(())
    }

    /// Remove a user from memory
    ///
    /// Only used to undo a registration whose save failed; users are never
    /// deleted once their record is on disk.
    pub fn remove(&self, id: UserId) -> Result<bool, ShareError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_username = self
            .by_username
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        match data.remove(&id) {
            Some(user) => {
                by_username.remove(&User::normalize_username(&user.username));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Check if a user exists
    pub fn exists(&self, id: UserId) -> Result<bool, ShareError> {
        let data = self
            .data
            .read()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.contains_key(&id))
    }

    /// Count users
    pub fn count(&self) -> Result<usize, ShareError> {
        let data = self
            .data
            .read()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}
