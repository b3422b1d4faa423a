//! JSON Export functionality
//!
//! Exports all users and expenses to JSON format with schema versioning.

use std::collections::HashSet;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ShareError, ShareResult, SplitError};
use crate::models::{Expense, Money, User};
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full database export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    pub users: Vec<User>,

    /// Expenses with their embedded allocations
    pub expenses: Vec<Expense>,

    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub user_count: usize,
    pub expense_count: usize,
    pub allocation_count: usize,

    /// Sum of all expense amounts
    pub system_total: Money,

    /// Date range of expenses (earliest)
    pub earliest_expense: Option<String>,

    /// Date range of expenses (latest)
    pub latest_expense: Option<String>,
}

impl FullExport {
    /// Create a new full export from storage
    pub fn from_storage(storage: &Storage) -> ShareResult<Self> {
        let users = storage.users.get_all()?;
        let expenses = storage.expenses.get_all()?;

        let system_total = Money::checked_sum(expenses.iter().map(|e| e.amount))
            .ok_or(SplitError::TotalOverflow)?;

        let metadata = ExportMetadata {
            user_count: users.len(),
            expense_count: expenses.len(),
            allocation_count: expenses.iter().map(|e| e.allocations.len()).sum(),
            system_total,
            earliest_expense: expenses.iter().map(|e| e.date).min().map(|d| d.to_string()),
            latest_expense: expenses.iter().map(|e| e.date).max().map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            users,
            expenses,
            metadata,
        })
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let mut user_ids = HashSet::new();
        let mut usernames = HashSet::new();
        for user in &self.users {
            user.validate()
                .map_err(|e| format!("User {}: {}", user.id, e))?;
            if !user_ids.insert(user.id) {
                return Err(format!("User {} appears more than once", user.id));
            }
            if !usernames.insert(User::normalize_username(&user.username)) {
                return Err(format!("Username {} appears more than once", user.username));
            }
        }

        let mut expense_ids = HashSet::new();
        for expense in &self.expenses {
            if !expense_ids.insert(expense.id) {
                return Err(format!("Expense {} appears more than once", expense.id));
            }
            expense
                .validate()
                .map_err(|e| format!("Expense {}: {}", expense.id, e))?;

            if !user_ids.contains(&expense.payer_id) {
                return Err(format!(
                    "Expense {} references unknown payer {}",
                    expense.id, expense.payer_id
                ));
            }

            let mut seen = HashSet::new();
            for allocation in &expense.allocations {
                if !user_ids.contains(&allocation.participant_id) {
                    return Err(format!(
                        "Expense {} references unknown participant {}",
                        expense.id, allocation.participant_id
                    ));
                }
                if !seen.insert(allocation.participant_id) {
                    return Err(format!(
                        "Expense {} lists participant {} more than once",
                        expense.id, allocation.participant_id
                    ));
                }
            }

            let owed = expense
                .allocations
                .iter()
                .map(|a| a.amount_owed.filter(|m| m.is_within_limit()))
                .collect::<Option<Vec<_>>>()
                .and_then(Money::checked_sum);
            if owed != Some(expense.amount) {
                return Err(format!(
                    "Allocations of expense {} do not add up to {}",
                    expense.id,
                    expense.amount.to_decimal_string()
                ));
            }
        }

        Ok(())
    }

    /// Replace everything in storage with the contents of this export
    ///
    /// The export is validated first. If writing to disk fails, the previous
    /// data is put back.
    pub fn restore_into(&self, storage: &Storage) -> ShareResult<()> {
        self.validate().map_err(ShareError::Validation)?;

        let previous_users = storage.users.get_all()?;
        let previous_expenses = storage.expenses.get_all()?;

        storage.users.replace_all(self.users.clone())?;
        storage.expenses.replace_all(self.expenses.clone())?;

        if let Err(e) = storage.save_all() {
            tracing::error!(error = %e, "restore failed, putting previous data back");
            storage.users.replace_all(previous_users)?;
            storage.expenses.replace_all(previous_expenses)?;
            if let Err(rewrite) = storage.save_all() {
                tracing::error!(error = %rewrite, "could not rewrite previous data");
            }
            return Err(e);
        }

        tracing::info!(
            users = self.users.len(),
            expenses = self.expenses.len(),
            exported_at = %self.exported_at,
            "restored full export"
        );
        Ok(())
    }
}

/// Export the full database to JSON
pub fn export_full_json<W: Write>(storage: &Storage, writer: &mut W, pretty: bool) -> ShareResult<()> {
    let export = FullExport::from_storage(storage)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| ShareError::Export(e.to_string()))?;

    Ok(())
}

/// Parse and verify a JSON export
pub fn import_from_json(json_str: &str) -> ShareResult<FullExport> {
    let export: FullExport = serde_json::from_str(json_str)?;
    export.validate().map_err(ShareError::Validation)?;
    Ok(export)
}
