//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod balance;
pub mod expense;
pub mod export;
pub mod user;

pub use balance::{handle_balance_command, BalanceCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, handle_import_command, ExportCommands, ExportFormat};
pub use user::{handle_user_command, UserCommands};
