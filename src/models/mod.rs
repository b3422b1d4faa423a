//! Core data models for SplitShare
//!
//! This module contains the data structures that represent the expense
//! sharing domain: users, expenses, allocations and the exact-decimal money
//! and percentage types they are built from.

pub mod expense;
pub mod ids;
pub mod money;
pub mod percentage;
pub mod user;

pub use expense::{Allocation, Expense, ParticipantInput, SplitMethod};
pub use ids::{ExpenseId, UserId};
pub use money::Money;
pub use percentage::Percentage;
pub use user::User;
