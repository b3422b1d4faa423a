//! Expense display formatting
//!
//! Formats expenses for terminal output in list and detail views.

use std::collections::HashMap;

use crate::config::Settings;
use crate::models::{Expense, SplitMethod, UserId};

/// Lookup of user display names
pub type UserNames = HashMap<UserId, String>;

fn name_of(names: &UserNames, id: UserId) -> String {
    names.get(&id).cloned().unwrap_or_else(|| id.to_string())
}

/// Format a list of expenses as a table
pub fn format_expense_list(expenses: &[Expense], names: &UserNames, settings: &Settings) -> String {
    if expenses.is_empty() {
        return "No expenses found.".to_string();
    }

    let title_width = expenses
        .iter()
        .map(|e| e.title.chars().count())
        .max()
        .unwrap_or(5)
        .clamp(5, 40);

    let payer_width = expenses
        .iter()
        .map(|e| name_of(names, e.payer_id).chars().count())
        .max()
        .unwrap_or(7)
        .max(7);

    let mut output = String::new();
    output.push_str(&format!(
        "{:<12}  {:<10}  {:<title_width$}  {:>12}  {:<10}  {:<payer_width$}  {}\n",
        "ID",
        "Date",
        "Title",
        "Amount",
        "Method",
        "Paid By",
        "Split",
        title_width = title_width,
        payer_width = payer_width,
    ));
    output.push_str(&format!(
        "{:-<12}  {:-<10}  {:-<title_width$}  {:->12}  {:-<10}  {:-<payer_width$}  {:-<5}\n",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        title_width = title_width,
        payer_width = payer_width,
    ));

    for expense in expenses {
        let title: String = expense.title.chars().take(title_width).collect();
        output.push_str(&format!(
            "{:<12}  {:<10}  {:<title_width$}  {:>12}  {:<10}  {:<payer_width$}  {}\n",
            expense.id.to_string(),
            expense.date.format(&settings.date_format).to_string(),
            title,
            expense.amount.format_with_symbol(&settings.currency_symbol),
            expense.split_method.to_string(),
            name_of(names, expense.payer_id),
            expense.allocations.len(),
            title_width = title_width,
            payer_width = payer_width,
        ));
    }

    output
}

/// Format a single expense with its allocations
pub fn format_expense_details(expense: &Expense, names: &UserNames, settings: &Settings) -> String {
    let symbol = &settings.currency_symbol;
    let mut output = String::new();

    output.push_str(&format!("Expense: {}\n", expense.title));
    output.push_str(&format!("  ID:             {}\n", expense.id));
    output.push_str(&format!(
        "  Date:           {}\n",
        expense.date.format(&settings.date_format)
    ));
    output.push_str(&format!(
        "  Amount:         {}\n",
        expense.amount.format_with_symbol(symbol)
    ));
    output.push_str(&format!("  Split:          {}\n", expense.split_method));
    output.push_str(&format!(
        "  Paid By:        {}\n",
        name_of(names, expense.payer_id)
    ));

    output.push_str("\n  Participants:\n");
    for allocation in &expense.allocations {
        let owed = allocation
            .amount_owed
            .map(|m| m.format_with_symbol(symbol))
            .unwrap_or_else(|| "(missing)".to_string());

        let share = match (expense.split_method, allocation.percentage_owed) {
            (SplitMethod::Percentage, Some(p)) => format!(" ({})", p),
            _ => String::new(),
        };

        output.push_str(&format!(
            "    {:<20} {:>12}{}\n",
            name_of(names, allocation.participant_id),
            owed,
            share
        ));
    }

    output
}
