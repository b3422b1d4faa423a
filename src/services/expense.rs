//! Expense service
//!
//! Ties the split calculator to persistence. An expense and its allocations
//! are validated together and written as one record; if the calculator
//! rejects the input nothing is written.

use chrono::{NaiveDate, Utc};

use crate::error::{ShareError, ShareResult};
use crate::models::{Expense, ExpenseId, Money, ParticipantInput, SplitMethod, UserId};
use crate::storage::Storage;

use super::split::compute_allocations;

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new expense
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub title: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub split_method: SplitMethod,
    pub participants: Vec<ParticipantInput>,
}

/// Fields to change on an existing expense; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub title: Option<String>,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub split_method: Option<SplitMethod>,
    /// New participant set; when omitted the stored participants are reused
    pub participants: Option<Vec<ParticipantInput>>,
}

impl ExpenseUpdate {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.amount.is_none()
            && self.date.is_none()
            && self.split_method.is_none()
            && self.participants.is_none()
    }
}

impl<'a> ExpenseService<'a> {
    /// Create a new expense service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create an expense paid by `payer_id` and split among the participants
    pub fn create(&self, payer_id: UserId, input: NewExpense) -> ShareResult<Expense> {
        self.require_user(payer_id)?;
        self.require_participants(&input.participants)?;

        let allocations = compute_allocations(input.amount, input.split_method, &input.participants)
            .map_err(|e| {
                tracing::warn!(title = %input.title, error = %e, "split rejected");
                e
            })?;

        let mut expense = Expense::new(
            input.title.trim(),
            input.amount,
            input.date,
            input.split_method,
            payer_id,
        );
        expense.allocations = allocations;

        expense
            .validate()
            .map_err(|e| ShareError::Validation(e.to_string()))?;

        self.storage.expenses.upsert(expense.clone())?;
        self.save_or_restore(expense.id, None)?;

        tracing::info!(
            expense_id = %expense.id,
            amount = %expense.amount.to_decimal_string(),
            method = %expense.split_method,
            participants = expense.allocations.len(),
            "created expense"
        );

        Ok(expense)
    }

    /// Update an expense, recomputing its allocations wholesale
    pub fn update(&self, id: ExpenseId, update: ExpenseUpdate) -> ShareResult<Expense> {
        let mut expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| ShareError::expense_not_found(id.to_string()))?;

        if update.is_empty() {
            return Ok(expense);
        }
        let previous = expense.clone();

        if let Some(title) = update.title {
            expense.title = title.trim().to_string();
        }
        if let Some(amount) = update.amount {
            expense.amount = amount;
        }
        if let Some(date) = update.date {
            expense.date = date;
        }
        if let Some(method) = update.split_method {
            expense.split_method = method;
        }

        let participants = match update.participants {
            Some(participants) => {
                self.require_participants(&participants)?;
                participants
            }
            None => expense
                .allocations
                .iter()
                .map(|a| ParticipantInput::from_allocation(a, expense.split_method))
                .collect(),
        };

        let allocations = compute_allocations(expense.amount, expense.split_method, &participants)
            .map_err(|e| {
                tracing::warn!(expense_id = %id, error = %e, "split rejected on update");
                e
            })?;

        expense.allocations = allocations;
        expense.updated_at = Utc::now();

        expense
            .validate()
            .map_err(|e| ShareError::Validation(e.to_string()))?;

        self.storage.expenses.upsert(expense.clone())?;
        self.save_or_restore(expense.id, Some(previous))?;

        tracing::info!(expense_id = %expense.id, "updated expense");

        Ok(expense)
    }

    /// Delete an expense together with its allocations
    pub fn delete(&self, id: ExpenseId) -> ShareResult<Expense> {
        let expense = self
            .storage
            .expenses
            .get(id)?
            .ok_or_else(|| ShareError::expense_not_found(id.to_string()))?;

        self.storage.expenses.delete(id)?;
        self.save_or_restore(id, Some(expense.clone()))?;

        tracing::info!(expense_id = %id, "deleted expense");

        Ok(expense)
    }

    /// Flush expenses to disk, putting `previous` back in memory if that fails
    ///
    /// `None` means the expense did not exist before the change.
    fn save_or_restore(&self, id: ExpenseId, previous: Option<Expense>) -> ShareResult<()> {
        let Err(e) = self.storage.expenses.save() else {
            return Ok(());
        };

        tracing::error!(expense_id = %id, error = %e, "save failed, restoring previous state");
        match previous {
            Some(expense) => self.storage.expenses.upsert(expense)?,
            None => {
                self.storage.expenses.delete(id)?;
            }
        }
        Err(e)
    }

    /// Get an expense by ID
    pub fn get(&self, id: ExpenseId) -> ShareResult<Option<Expense>> {
        self.storage.expenses.get(id)
    }

    /// Find an expense by full UUID or short `exp-` ID
    pub fn find(&self, identifier: &str) -> ShareResult<Option<Expense>> {
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<ExpenseId>() {
            return self.storage.expenses.get(id);
        }

        let mut matches = self.storage.expenses.find_by_prefix(identifier)?;
        if matches.len() == 1 {
            Ok(matches.pop())
        } else {
            Ok(None)
        }
    }

    /// Resolve an expense reference or fail with `NotFound`
    pub fn resolve(&self, identifier: &str) -> ShareResult<Expense> {
        self.find(identifier)?
            .ok_or_else(|| ShareError::expense_not_found(identifier))
    }

    /// All expenses, newest first
    pub fn list(&self) -> ShareResult<Vec<Expense>> {
        self.storage.expenses.get_all()
    }

    /// Expenses in which `user_id` is a participant, newest first
    pub fn list_for_participant(&self, user_id: UserId) -> ShareResult<Vec<Expense>> {
        let mut expenses = self.storage.expenses.get_by_user(user_id)?;
        expenses.retain(|e| e.has_participant(user_id));
        Ok(expenses)
    }

    /// Expenses paid by `user_id`, newest first
    pub fn list_paid_by(&self, user_id: UserId) -> ShareResult<Vec<Expense>> {
        let mut expenses = self.storage.expenses.get_by_user(user_id)?;
        expenses.retain(|e| e.payer_id == user_id);
        Ok(expenses)
    }

    /// Count expenses
    pub fn count(&self) -> ShareResult<usize> {
        self.storage.expenses.count()
    }

    fn require_user(&self, id: UserId) -> ShareResult<()> {
        if self.storage.users.exists(id)? {
            Ok(())
        } else {
            Err(ShareError::user_not_found(id.to_string()))
        }
    }

    fn require_participants(&self, participants: &[ParticipantInput]) -> ShareResult<()> {
        for p in participants {
            self.require_user(p.participant_id)?;
        }
        Ok(())
    }
}
