//! Display formatting for terminal output
//!
//! Formats users, expenses, and balances for the CLI. Amounts are shown
//! with the configured currency symbol and dates with the configured format.

pub mod balance;
pub mod expense;
pub mod user;

pub use balance::{format_system_total, format_user_summary};
pub use expense::{format_expense_details, format_expense_list, UserNames};
pub use user::{format_user_details, format_user_list};
