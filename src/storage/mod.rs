//! Storage layer for SplitShare
//!
//! Provides JSON file storage with atomic writes and automatic directory
//! creation. Expenses are stored with their allocations embedded, so every
//! create, update, or delete of an expense is a single-record replacement.

pub mod expenses;
pub mod file_io;
pub mod init;
pub mod users;

pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use users::UserRepository;

use crate::config::paths::SplitSharePaths;
use crate::error::ShareError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: SplitSharePaths,
    pub users: UserRepository,
    pub expenses: ExpenseRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: SplitSharePaths) -> Result<Self, ShareError> {
        paths.ensure_directories()?;

        Ok(Self {
            users: UserRepository::new(paths.users_file()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &SplitSharePaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), ShareError> {
        self.users.load()?;
        self.expenses.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), ShareError> {
        self.users.save()?;
        self.expenses.save()?;
        Ok(())
    }

    /// Check if storage has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}
