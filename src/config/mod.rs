//! Configuration module for SplitShare
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::SplitSharePaths;
pub use settings::Settings;
