//! Service layer for SplitShare
//!
//! The service layer provides business logic on top of the storage layer:
//! the split calculator, balance aggregation, and the user and expense
//! workflows that validate input before anything is persisted.

pub mod balance;
pub mod expense;
pub mod split;
pub mod user;

pub use balance::{BalanceLedger, BalanceService, UserSummary};
pub use expense::{ExpenseService, ExpenseUpdate, NewExpense};
pub use split::compute_allocations;
pub use user::UserService;
