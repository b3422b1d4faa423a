//! Path management for SplitShare
//!
//! ## Path Resolution Order
//!
//! 1. `SPLITSHARE_DATA_DIR` environment variable (if set)
//! 2. The platform config directory for `splitshare`, e.g.
//!    `~/.config/splitshare` on Linux or `%APPDATA%\splitshare\config` on Windows

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::ShareError;

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "SPLITSHARE_DATA_DIR";

/// Manages all paths used by SplitShare
#[derive(Debug, Clone)]
pub struct SplitSharePaths {
    base_dir: PathBuf,
}

impl SplitSharePaths {
    /// Resolve paths from the environment or the platform defaults
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn new() -> Result<Self, ShareError> {
        let base_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(custom) if !custom.is_empty() => PathBuf::from(custom),
            _ => ProjectDirs::from("", "", "splitshare")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    ShareError::Config("Could not determine a home directory".into())
                })?,
        };

        Ok(Self { base_dir })
    }

    /// Create paths rooted at a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to users.json
    pub fn users_file(&self) -> PathBuf {
        self.data_dir().join("users.json")
    }

    /// Get the path to expenses.json (expenses with their allocations)
    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), ShareError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| ShareError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| ShareError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if SplitShare has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}
