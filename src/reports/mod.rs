//! Reports module for SplitShare
//!
//! Provides the balance sheet: per-user totals and pairwise balances.

pub mod balance_sheet;

pub use balance_sheet::{BalanceSheetReport, BalanceSheetRow, CounterpartyBalance};
