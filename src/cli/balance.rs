//! Balance CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_system_total, format_user_summary};
use crate::error::ShareResult;
use crate::reports::BalanceSheetReport;
use crate::services::{BalanceService, UserService};
use crate::storage::Storage;

use super::expense::user_names;

/// Balance subcommands
#[derive(Subcommand)]
pub enum BalanceCommands {
    /// Show one user's totals and balances with others
    Show {
        /// Username or ID
        user: String,
    },
    /// Show the balance sheet for every user
    All,
    /// Show the sum of all expenses
    Total,
}

/// Handle a balance command
pub fn handle_balance_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BalanceCommands,
) -> ShareResult<()> {
    let service = BalanceService::new(storage);

    match cmd {
        BalanceCommands::Show { user } => {
            let user = UserService::new(storage).resolve(&user)?;
            let summary = service.user_summary(user.id)?;
            print!(
                "{}",
                format_user_summary(&summary, &user_names(storage)?, settings)
            );
        }

        BalanceCommands::All => {
            let report = BalanceSheetReport::generate(storage)?;
            print!("{}", report.format_terminal());
        }

        BalanceCommands::Total => {
            let ledger = service.ledger()?;
            print!(
                "{}",
                format_system_total(ledger.system_total(), ledger.expense_count(), settings)
            );
        }
    }

    Ok(())
}
