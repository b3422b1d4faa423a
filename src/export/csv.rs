//! CSV Export functionality
//!
//! Exports the balance sheet and the expense ledger to CSV. Amounts are
//! written as exact fixed-point strings ("12.34").

use std::collections::HashMap;
use std::io::Write;

use crate::error::ShareResult;
use crate::models::UserId;
use crate::reports::BalanceSheetReport;
use crate::storage::Storage;

/// Header row of the balance sheet CSV
pub const BALANCE_SHEET_HEADER: [&str; 5] = [
    "User",
    "Total Paid",
    "Total Owed",
    "Net Balance",
    "Balances with Others",
];

/// Export the balance sheet, one row per user ordered by username
pub fn export_balance_sheet_csv<W: Write>(storage: &Storage, writer: W) -> ShareResult<()> {
    let report = BalanceSheetReport::generate(storage)?;
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(BALANCE_SHEET_HEADER)?;

    for row in &report.rows {
        csv.write_record([
            row.username.clone(),
            row.total_paid.to_decimal_string(),
            row.total_owed.to_decimal_string(),
            row.net_balance.to_decimal_string(),
            row.counterparties_summary(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Export every expense with one row per allocation, newest first
pub fn export_expenses_csv<W: Write>(storage: &Storage, writer: W) -> ShareResult<()> {
    let names: HashMap<UserId, String> = storage
        .users
        .get_all()?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();
    let name_of = |id: UserId| names.get(&id).cloned().unwrap_or_else(|| id.to_string());

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "Expense ID",
        "Date",
        "Title",
        "Amount",
        "Split Method",
        "Paid By",
        "Participant",
        "Amount Owed",
        "Percentage Owed",
    ])?;

    for expense in storage.expenses.get_all()? {
        for allocation in &expense.allocations {
            csv.write_record([
                expense.id.as_uuid().to_string(),
                expense.date.to_string(),
                expense.title.clone(),
                expense.amount.to_decimal_string(),
                expense.split_method.to_string(),
                name_of(expense.payer_id),
                name_of(allocation.participant_id),
                allocation
                    .amount_owed
                    .map(|m| m.to_decimal_string())
                    .unwrap_or_default(),
                allocation
                    .percentage_owed
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
            ])?;
        }
    }

    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SplitSharePaths;
    use crate::models::{Money, ParticipantInput, Percentage, SplitMethod, User};
    use crate::services::{ExpenseService, NewExpense};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = SplitSharePaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seed(storage: &Storage) {
        let alice = User::new("alice", "5551234");
        let bob = User::new("bob", "5559876");
        storage.users.upsert(alice.clone()).unwrap();
        storage.users.upsert(bob.clone()).unwrap();

        ExpenseService::new(storage)
            .create(
                alice.id,
                NewExpense {
                    title: "Cabin, weekend".into(),
                    amount: Money::from_cents(20000),
                    date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                    split_method: SplitMethod::Percentage,
                    participants: vec![
                        ParticipantInput::percentage(alice.id, Percentage::from_whole(25)),
                        ParticipantInput::percentage(bob.id, Percentage::from_whole(75)),
                    ],
                },
            )
            .unwrap();
    }

    #[test]
    fn test_balance_sheet_csv() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);

        let mut output = Vec::new();
        export_balance_sheet_csv(&storage, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(
            lines[0],
            "User,Total Paid,Total Owed,Net Balance,Balances with Others"
        );
        assert_eq!(lines[1], "alice,200.00,50.00,150.00,bob: 150.00");
        assert_eq!(lines[2], "bob,0.00,150.00,-150.00,alice: -150.00");
    }

    #[test]
    fn test_expenses_csv_quotes_and_rows() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);

        let mut output = Vec::new();
        export_expenses_csv(&storage, &mut output).unwrap();
        let text = String::from_utf8(output).unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][2], "Cabin, weekend");
        assert_eq!(&rows[0][4], "PERCENTAGE");
        assert_eq!(&rows[0][6], "alice");
        assert_eq!(&rows[0][7], "50.00");
        assert_eq!(&rows[0][8], "25%");
        assert_eq!(&rows[1][7], "150.00");
    }

    #[test]
    fn test_empty_exports_have_headers() {
        let (_temp_dir, storage) = create_test_storage();

        let mut output = Vec::new();
        export_balance_sheet_csv(&storage, &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);

        let mut output = Vec::new();
        export_expenses_csv(&storage, &mut output).unwrap();
        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);
    }
}
