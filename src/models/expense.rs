//! Expense model
//!
//! An expense records who paid, how much, and how the amount is split among
//! its participants. Allocations are owned by the expense: they are created,
//! replaced and deleted together with it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{ExpenseId, UserId};
use super::money::Money;
use super::percentage::Percentage;

/// Maximum expense title length
pub const MAX_TITLE_LEN: usize = 100;

/// Strategy for dividing an expense among participants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum SplitMethod {
    /// Everyone owes the same share
    #[default]
    Equal,
    /// Each participant's amount is given explicitly
    Exact,
    /// Each participant owes a percentage of the total
    Percentage,
}

impl SplitMethod {
    /// All split methods
    pub fn all() -> &'static [SplitMethod] {
        &[Self::Equal, Self::Exact, Self::Percentage]
    }
}

impl fmt::Display for SplitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equal => write!(f, "EQUAL"),
            Self::Exact => write!(f, "EXACT"),
            Self::Percentage => write!(f, "PERCENTAGE"),
        }
    }
}

impl FromStr for SplitMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EQUAL" => Ok(Self::Equal),
            "EXACT" => Ok(Self::Exact),
            "PERCENTAGE" | "PERCENT" => Ok(Self::Percentage),
            other => Err(format!("Unknown split method: {}", other)),
        }
    }
}

/// One participant's input to the split calculator
///
/// Which optional field is required depends on the split method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInput {
    pub participant_id: UserId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_owed: Option<Money>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_owed: Option<Percentage>,
}

impl ParticipantInput {
    /// Input for an equal split
    pub fn equal(participant_id: UserId) -> Self {
        Self {
            participant_id,
            amount_owed: None,
            percentage_owed: None,
        }
    }

    /// Input for an exact split
    pub fn exact(participant_id: UserId, amount: Money) -> Self {
        Self {
            participant_id,
            amount_owed: Some(amount),
            percentage_owed: None,
        }
    }

    /// Input for a percentage split
    pub fn percentage(participant_id: UserId, percentage: Percentage) -> Self {
        Self {
            participant_id,
            amount_owed: None,
            percentage_owed: Some(percentage),
        }
    }

    /// Rebuild the input a stored allocation would need under `method`
    ///
    /// Used when an expense is updated without new participant data: the
    /// current participants are kept and only the field `method` reads is
    /// carried over.
    pub fn from_allocation(allocation: &Allocation, method: SplitMethod) -> Self {
        match method {
            SplitMethod::Equal => Self::equal(allocation.participant_id),
            SplitMethod::Exact => Self {
                participant_id: allocation.participant_id,
                amount_owed: allocation.amount_owed,
                percentage_owed: None,
            },
            SplitMethod::Percentage => Self {
                participant_id: allocation.participant_id,
                amount_owed: None,
                percentage_owed: allocation.percentage_owed,
            },
        }
    }
}

/// The owed-amount record linking one participant to one expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub participant_id: UserId,

    /// Amount this participant owes; absent only in corrupted data
    #[serde(default)]
    pub amount_owed: Option<Money>,

    /// Percentage share, populated for percentage splits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage_owed: Option<Percentage>,
}

impl Allocation {
    /// Create an allocation with a computed amount
    pub fn new(participant_id: UserId, amount_owed: Money) -> Self {
        Self {
            participant_id,
            amount_owed: Some(amount_owed),
            percentage_owed: None,
        }
    }

    /// Create an allocation carrying its percentage share
    pub fn with_percentage(
        participant_id: UserId,
        amount_owed: Money,
        percentage_owed: Percentage,
    ) -> Self {
        Self {
            participant_id,
            amount_owed: Some(amount_owed),
            percentage_owed: Some(percentage_owed),
        }
    }
}

/// A shared expense with its allocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier
    pub id: ExpenseId,

    /// Short description
    pub title: String,

    /// Total amount paid (always positive)
    pub amount: Money,

    /// Date of the expense
    pub date: NaiveDate,

    /// How the amount is divided
    pub split_method: SplitMethod,

    /// The user who paid
    pub payer_id: UserId,

    /// One allocation per participant, in input order
    #[serde(default)]
    pub allocations: Vec<Allocation>,

    /// When the expense was created
    pub created_at: DateTime<Utc>,

    /// When the expense was last modified
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Create a new expense with no allocations yet
    pub fn new(
        title: impl Into<String>,
        amount: Money,
        date: NaiveDate,
        split_method: SplitMethod,
        payer_id: UserId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            title: title.into(),
            amount,
            date,
            split_method,
            payer_id,
            allocations: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the whole allocation set
    pub fn set_allocations(&mut self, allocations: Vec<Allocation>) {
        self.allocations = allocations;
        self.updated_at = Utc::now();
    }

    /// Participants in allocation order
    pub fn participant_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.allocations.iter().map(|a| a.participant_id)
    }

    /// Whether `user_id` is one of the participants
    pub fn has_participant(&self, user_id: UserId) -> bool {
        self.allocations.iter().any(|a| a.participant_id == user_id)
    }

    /// The allocation for `user_id`, if any
    pub fn allocation_for(&self, user_id: UserId) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.participant_id == user_id)
    }

    /// Validate the expense header fields
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ExpenseValidationError::EmptyTitle);
        }
        let title_len = title.chars().count();
        if title_len > MAX_TITLE_LEN {
            return Err(ExpenseValidationError::TitleTooLong(title_len));
        }
        if !self.amount.is_positive() {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }
        if !self.amount.is_within_limit() {
            return Err(ExpenseValidationError::AmountTooLarge(self.amount));
        }
        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.title, self.amount.to_decimal_string())
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpenseValidationError {
    EmptyTitle,
    TitleTooLong(usize),
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Expense title cannot be empty"),
            Self::TitleTooLong(len) => write!(
                f,
                "Expense title too long ({} chars, max {})",
                len, MAX_TITLE_LEN
            ),
            Self::NonPositiveAmount(m) => {
                write!(f, "Expense amount must be positive, got {}", m)
            }
            Self::AmountTooLarge(m) => write!(
                f,
                "Expense amount {} exceeds the maximum of {}",
                m,
                Money::MAX
            ),
        }
    }
}

impl std::error::Error for ExpenseValidationError {}
