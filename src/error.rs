//! Custom error types for SplitShare
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions. `SplitError` covers everything the split
//! calculator and balance aggregator can reject; `ShareError` wraps it together
//! with storage, configuration and export failures.

use std::fmt;

use thiserror::Error;

use crate::models::{ExpenseId, Money, Percentage, SplitMethod, UserId};

/// A reconciled total reported by `SplitError::SplitMismatch`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitTotal {
    /// Sum of exact amounts
    Amount(Money),
    /// Sum of percentages
    Percent(Percentage),
}

impl SplitTotal {
    /// Difference `actual - expected` in the unit of the totals
    ///
    /// Amounts are compared in cents, percentages in hundredths of a percent.
    /// Mixed units never occur in a mismatch the calculator produces.
    pub fn delta(expected: Self, actual: Self) -> i64 {
        match (expected, actual) {
            (Self::Amount(e), Self::Amount(a)) => a.cents() - e.cents(),
            (Self::Percent(e), Self::Percent(a)) => a.hundredths() - e.hundredths(),
            _ => 0,
        }
    }
}

impl fmt::Display for SplitTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(m) => write!(f, "{}", m.to_decimal_string()),
            Self::Percent(p) => write!(f, "{}", p),
        }
    }
}

/// Errors raised while computing or aggregating splits
///
/// None of these are retryable: they describe malformed input or corrupted
/// data, and every one aborts the computation with no partial result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    /// A participant supplied fields the split method does not accept
    #[error("Invalid input for {method} split (participant {participant_id}): {reason}")]
    InvalidInputForMethod {
        method: SplitMethod,
        participant_id: UserId,
        reason: String,
    },

    /// Shares do not add up to the required total
    #[error("Split mismatch: expected {expected}, got {actual}")]
    SplitMismatch {
        expected: SplitTotal,
        actual: SplitTotal,
    },

    /// No participants were given
    #[error("An expense needs at least one participant")]
    EmptyParticipantList,

    /// Expense amount is zero or negative
    #[error("Expense amount must be positive, got {}", .0.to_decimal_string())]
    NonPositiveAmount(Money),

    /// Expense amount or a single share is above `Money::MAX`
    #[error(
        "Amount {} exceeds the maximum of {}",
        .0.to_decimal_string(),
        Money::MAX.to_decimal_string()
    )]
    AmountTooLarge(Money),

    /// A running total no longer fits in the money representation
    #[error("Total of the amounts involved is too large to represent")]
    TotalOverflow,

    /// The same user was listed twice
    #[error("Participant {0} is listed more than once")]
    DuplicateParticipant(UserId),

    /// A stored allocation has no computed amount
    #[error("Allocation for participant {participant_id} on expense {expense_id} has no amount owed")]
    IncompleteAllocation {
        expense_id: ExpenseId,
        participant_id: UserId,
    },
}

impl SplitError {
    /// Difference between actual and expected totals, if this is a mismatch
    pub fn mismatch_delta(&self) -> Option<i64> {
        match self {
            Self::SplitMismatch { expected, actual } => Some(SplitTotal::delta(*expected, *actual)),
            _ => None,
        }
    }
}

/// The main error type for SplitShare operations
#[derive(Error, Debug)]
pub enum ShareError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Split calculation or aggregation errors
    #[error(transparent)]
    Split(#[from] SplitError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ShareError {
    /// Create a "not found" error for users
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "User",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The underlying split error, if any
    pub fn as_split(&self) -> Option<&SplitError> {
        match self {
            Self::Split(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ShareError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ShareError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for ShareError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for SplitShare operations
pub type ShareResult<T> = Result<T, ShareError>;
