//! Expense repository for JSON storage
//!
//! Manages loading and saving expenses to expenses.json. Allocations live
//! inside their expense, so an upsert replaces the whole allocation set at
//! once and a delete removes it with the expense.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::ShareError;
use crate::models::{Expense, ExpenseId, UserId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable expense data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ExpenseData {
    expenses: Vec<Expense>,
}

/// Repository for expense persistence with a participant index
pub struct ExpenseRepository {
    path: PathBuf,
    data: RwLock<HashMap<ExpenseId, Expense>>,
    /// Index: user_id -> expenses they paid for or participate in
    by_user: RwLock<HashMap<UserId, Vec<ExpenseId>>>,
}

impl ExpenseRepository {
    /// Create a new expense repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_user: RwLock::new(HashMap::new()),
        }
    }

    /// Load expenses from disk and build the index
    pub fn load(&self) -> Result<(), ShareError> {
        let file_data: ExpenseData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_user = self
            .by_user
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_user.clear();

        for expense in file_data.expenses {
            index_expense(&mut by_user, &expense);
            data.insert(expense.id, expense);
        }

        Ok(())
    }

    /// Save expenses to disk
    pub fn save(&self) -> Result<(), ShareError> {
        let expenses = self.get_all()?;
        write_json_atomic(&self.path, &ExpenseData { expenses })
    }

    /// Get an expense by ID
    pub fn get(&self, id: ExpenseId) -> Result<Option<Expense>, ShareError> {
        let data = self
            .data
            .read()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.get(&id).cloned())
    }

    /// Get all expenses, newest first
    ///
    /// The result is a consistent snapshot: it is taken under one read lock,
    /// so it never contains a half-applied update.
    pub fn get_all(&self) -> Result<Vec<Expense>, ShareError> {
        let data = self
            .data
            .read()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut expenses: Vec<_> = data.values().cloned().collect();
        sort_newest_first(&mut expenses);
        Ok(expenses)
    }

    /// Expenses a user paid for or participates in, newest first
    pub fn get_by_user(&self, user_id: UserId) -> Result<Vec<Expense>, ShareError> {
        let data = self
            .data
            .read()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        let by_user = self
            .by_user
            .read()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let ids = by_user.get(&user_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut expenses: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        sort_newest_first(&mut expenses);
        Ok(expenses)
    }

    /// Find expenses whose ID matches a short prefix like `exp-1a2b3c4d`
    pub fn find_by_prefix(&self, prefix: &str) -> Result<Vec<Expense>, ShareError> {
        let data = self
            .data
            .read()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data
            .values()
            .filter(|e| e.id.matches_prefix(prefix))
            .cloned()
            .collect())
    }

    /// Insert or replace an expense together with its allocations
    pub fn upsert(&self, expense: Expense) -> Result<(), ShareError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_user = self
            .by_user
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if let Some(old) = data.get(&expense.id) {
            unindex_expense(&mut by_user, old);
        }
        index_expense(&mut by_user, &expense);

        data.insert(expense.id, expense);
        Ok(())
    }

    /// Replace every expense in memory, rebuilding the participant index
    pub fn replace_all(&self, expenses: Vec<Expense>) -> Result<(), ShareError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_user = self
            .by_user
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        by_user.clear();

        for expense in expenses {
            index_expense(&mut by_user, &expense);
            data.insert(expense.id, expense);
        }

        Ok(())
    }

    /// Delete an expense and its allocations
    pub fn delete(&self, id: ExpenseId) -> Result<bool, ShareError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        let mut by_user = self
            .by_user
            .write()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        match data.remove(&id) {
            Some(expense) => {
                unindex_expense(&mut by_user, &expense);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Count expenses
    pub fn count(&self) -> Result<usize, ShareError> {
        let data = self
            .data
            .read()
            .map_err(|e| ShareError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(data.len())
    }
}

fn involved_users(expense: &Expense) -> Vec<UserId> {
    let mut users: Vec<UserId> = std::iter::once(expense.payer_id)
        .chain(expense.participant_ids())
        .collect();
    users.sort();
    users.dedup();
    users
}

fn index_expense(by_user: &mut HashMap<UserId, Vec<ExpenseId>>, expense: &Expense) {
    for user in involved_users(expense) {
        by_user.entry(user).or_default().push(expense.id);
    }
}

fn unindex_expense(by_user: &mut HashMap<UserId, Vec<ExpenseId>>, expense: &Expense) {
    for user in involved_users(expense) {
        if let Some(ids) = by_user.get_mut(&user) {
            ids.retain(|&id| id != expense.id);
        }
    }
}

fn sort_newest_first(expenses: &mut [Expense]) {
    expenses.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then(b.created_at.cmp(&a.created_at))
            .then(a.id.cmp(&b.id))
    });
}
