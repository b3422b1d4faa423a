//! Balance display formatting

use crate::config::Settings;
use crate::models::Money;
use crate::services::UserSummary;

use super::expense::UserNames;

/// Format one user's balance summary
pub fn format_user_summary(summary: &UserSummary, names: &UserNames, settings: &Settings) -> String {
    let symbol = &settings.currency_symbol;
    let name = names
        .get(&summary.user_id)
        .cloned()
        .unwrap_or_else(|| summary.user_id.to_string());

    let mut output = String::new();
    output.push_str(&format!("Balance for {}\n", name));
    output.push_str(&format!(
        "  Total Paid:     {:>12}\n",
        summary.total_paid.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Total Owed:     {:>12}\n",
        summary.total_owed.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Net Balance:    {:>12}\n",
        summary.net_balance.format_with_symbol(symbol)
    ));

    let mut lines: Vec<(String, Money)> = summary
        .counterparty_balances
        .iter()
        .filter(|(_, balance)| !settings.hide_zero_balances || !balance.is_zero())
        .map(|(id, &balance)| {
            let other = names.get(id).cloned().unwrap_or_else(|| id.to_string());
            (other, balance)
        })
        .collect();
    lines.sort();

    if lines.is_empty() {
        output.push_str("\n  Settled up with everyone.\n");
        return output;
    }

    output.push_str("\n  Balances with others:\n");
    for (other, balance) in lines {
        let line = if balance.is_negative() {
            format!("you owe {} {}", other, balance.abs().format_with_symbol(symbol))
        } else if balance.is_zero() {
            format!("settled with {}", other)
        } else {
            format!("{} owes you {}", other, balance.format_with_symbol(symbol))
        };
        output.push_str(&format!("    {}\n", line));
    }

    output
}

/// Format the sum of all expenses
pub fn format_system_total(total: Money, expense_count: usize, settings: &Settings) -> String {
    format!(
        "Total expenses: {} across {} expense(s)\n",
        total.format_with_symbol(&settings.currency_symbol),
        expense_count
    )
}
