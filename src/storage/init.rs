//! Storage initialization
//!
//! Handles first-run setup: directories, default settings, and empty data files.

use crate::config::paths::SplitSharePaths;
use crate::config::settings::Settings;
use crate::error::ShareError;

use super::expenses::ExpenseRepository;
use super::users::UserRepository;

/// Initialize storage for a fresh installation
///
/// Existing files are left untouched, so running this twice is harmless.
pub fn initialize_storage(paths: &SplitSharePaths) -> Result<(), ShareError> {
    paths.ensure_directories()?;

    if !paths.settings_file().exists() {
        Settings::default().save(paths)?;
    }

    if !paths.users_file().exists() {
        UserRepository::new(paths.users_file()).save()?;
    }

    if !paths.expenses_file().exists() {
        ExpenseRepository::new(paths.expenses_file()).save()?;
    }

    tracing::info!(base_dir = %paths.base_dir().display(), "initialized storage");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_creates_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SplitSharePaths::with_base_dir(temp_dir.path().to_path_buf());

        initialize_storage(&paths).unwrap();

        assert!(paths.is_initialized());
        assert!(paths.users_file().exists());
        assert!(paths.expenses_file().exists());
    }

    #[test]
    fn test_initialize_keeps_existing_settings() {
        let temp_dir = TempDir::new().unwrap();
        let paths = SplitSharePaths::with_base_dir(temp_dir.path().to_path_buf());

        let settings = Settings {
            currency_symbol: "€".into(),
            ..Settings::default()
        };
        settings.save(&paths).unwrap();

        initialize_storage(&paths).unwrap();
        assert_eq!(Settings::load_or_create(&paths).unwrap().currency_symbol, "€");
    }
}
