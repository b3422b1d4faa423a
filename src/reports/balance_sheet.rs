//! Balance Sheet Report
//!
//! One row per user with what they paid, what they owe, and where they stand
//! against every other user.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::ShareResult;
use crate::models::{Money, UserId};
use crate::services::BalanceService;
use crate::storage::Storage;

/// Balance against one other user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterpartyBalance {
    pub user_id: UserId,
    pub username: String,
    /// Positive: they owe this row's user. Negative: this row's user owes them.
    pub balance: Money,
}

/// A single user's line in the sheet
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheetRow {
    pub user_id: UserId,
    pub username: String,
    pub total_paid: Money,
    pub total_owed: Money,
    pub net_balance: Money,
    /// Non-zero balances, ordered by counterparty username
    pub counterparties: Vec<CounterpartyBalance>,
}

impl BalanceSheetRow {
    /// Counterparties rendered as `name: 12.34; other: -5.00`
    pub fn counterparties_summary(&self) -> String {
        self.counterparties
            .iter()
            .map(|c| format!("{}: {}", c.username, c.balance.to_decimal_string()))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Balance sheet across all users
#[derive(Debug, Clone, Serialize)]
pub struct BalanceSheetReport {
    /// Rows ordered by username
    pub rows: Vec<BalanceSheetRow>,
    /// Sum of all expense amounts
    pub system_total: Money,
    pub expense_count: usize,
}

impl BalanceSheetReport {
    /// Generate the balance sheet from current storage
    pub fn generate(storage: &Storage) -> ShareResult<Self> {
        let users = storage.users.get_all()?;
        let ledger = BalanceService::new(storage).ledger()?;

        let names: HashMap<UserId, &str> = users
            .iter()
            .map(|u| (u.id, u.username.as_str()))
            .collect();

        let rows = users
            .iter()
            .map(|user| {
                let summary = ledger.user_summary(user.id);

                let mut counterparties: Vec<_> = summary
                    .nonzero_counterparties()
                    .map(|(&other, &balance)| CounterpartyBalance {
                        user_id: other,
                        username: names
                            .get(&other)
                            .map(|n| n.to_string())
                            .unwrap_or_else(|| other.to_string()),
                        balance,
                    })
                    .collect();
                counterparties.sort_by(|a, b| a.username.cmp(&b.username));

                BalanceSheetRow {
                    user_id: user.id,
                    username: user.username.clone(),
                    total_paid: summary.total_paid,
                    total_owed: summary.total_owed,
                    net_balance: summary.net_balance,
                    counterparties,
                }
            })
            .collect();

        Ok(Self {
            rows,
            system_total: ledger.system_total(),
            expense_count: ledger.expense_count(),
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str("Balance Sheet\n");
        output.push_str(&"=".repeat(72));
        output.push('\n');

        output.push_str(&format!(
            "{:<20} {:>12} {:>12} {:>12}\n",
            "User", "Paid", "Owed", "Net"
        ));
        output.push_str(&"-".repeat(72));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "{:<20} {:>12} {:>12} {:>12}\n",
                truncate(&row.username, 20),
                row.total_paid.to_decimal_string(),
                row.total_owed.to_decimal_string(),
                row.net_balance.to_decimal_string()
            ));

            for c in &row.counterparties {
                let relation = if c.balance.is_negative() {
                    "owes"
                } else {
                    "is owed by"
                };
                output.push_str(&format!(
                    "    {} {} {}\n",
                    relation,
                    c.username,
                    c.balance.abs().to_decimal_string()
                ));
            }
        }

        output.push_str(&"-".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "Total expenses: {} across {} expense(s)\n",
            self.system_total.to_decimal_string(),
            self.expense_count
        ));

        output
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 1).collect();
        format!("{}…", cut)
    }
}
