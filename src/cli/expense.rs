//! Expense CLI commands
//!
//! Participants are given as repeated `-p` flags: `-p alice` for an equal
//! split, `-p alice=30.00` for an exact amount, `-p alice=50%` for a share.

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_expense_details, format_expense_list, UserNames};
use crate::error::{ShareError, ShareResult, SplitError};
use crate::models::{Money, ParticipantInput, Percentage, SplitMethod, UserId};
use crate::services::{ExpenseService, ExpenseUpdate, NewExpense, UserService};
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Add a new expense
    Add {
        /// Short description
        title: String,
        /// Total amount (e.g. 90.00)
        amount: String,
        /// Who paid (username or ID)
        #[arg(long)]
        payer: String,
        /// Split method: equal, exact, or percentage
        #[arg(short, long, default_value = "equal")]
        method: String,
        /// Expense date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Participant as USER or USER=VALUE (repeatable)
        #[arg(short = 'p', long = "participant", required = true)]
        participants: Vec<String>,
    },
    /// Update an expense; allocations are recomputed
    Update {
        /// Expense ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(short, long)]
        method: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
        /// Replacement participant list (repeatable)
        #[arg(short = 'p', long = "participant")]
        participants: Vec<String>,
    },
    /// List expenses
    List {
        /// Only expenses this user participates in
        #[arg(short, long)]
        user: Option<String>,
        /// Only expenses this user paid for
        #[arg(long)]
        paid_by: Option<String>,
    },
    /// Show expense details
    Show {
        /// Expense ID
        id: String,
    },
    /// Delete an expense
    Delete {
        /// Expense ID
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> ShareResult<()> {
    let service = ExpenseService::new(storage);
    let users = UserService::new(storage);

    match cmd {
        ExpenseCommands::Add {
            title,
            amount,
            payer,
            method,
            date,
            participants,
        } => {
            let payer = users.resolve(&payer)?;
            let method = parse_method(&method)?;
            let input = NewExpense {
                title,
                amount: parse_amount(&amount)?,
                date: parse_date(date.as_deref())?,
                split_method: method,
                participants: resolve_participants(&users, &participants, method)?,
            };

            let expense = service.create(payer.id, input)?;
            println!("Added expense: {} ({})", expense, expense.id);
            print!("{}", format_expense_details(&expense, &user_names(storage)?, settings));
        }

        ExpenseCommands::Update {
            id,
            title,
            amount,
            method,
            date,
            participants,
        } => {
            let current = service.resolve(&id)?;
            let method = method.as_deref().map(parse_method).transpose()?;
            let effective_method = method.unwrap_or(current.split_method);

            let update = ExpenseUpdate {
                title,
                amount: amount.as_deref().map(parse_amount).transpose()?,
                date: date.as_deref().map(|d| parse_date(Some(d))).transpose()?,
                split_method: method,
                participants: if participants.is_empty() {
                    None
                } else {
                    Some(resolve_participants(&users, &participants, effective_method)?)
                },
            };

            let expense = service.update(current.id, update)?;
            println!("Updated expense: {}", expense);
            print!("{}", format_expense_details(&expense, &user_names(storage)?, settings));
        }

        ExpenseCommands::List { user, paid_by } => {
            let expenses = match (user, paid_by) {
                (Some(user), _) => service.list_for_participant(users.resolve(&user)?.id)?,
                (None, Some(payer)) => service.list_paid_by(users.resolve(&payer)?.id)?,
                (None, None) => service.list()?,
            };

            println!(
                "{}",
                format_expense_list(&expenses, &user_names(storage)?, settings)
            );
            if !expenses.is_empty() {
                let total = Money::checked_sum(expenses.iter().map(|e| e.amount))
                    .ok_or(SplitError::TotalOverflow)?;
                println!(
                    "Total: {} expenses, {}",
                    expenses.len(),
                    total.format_with_symbol(&settings.currency_symbol)
                );
            }
        }

        ExpenseCommands::Show { id } => {
            let expense = service.resolve(&id)?;
            print!("{}", format_expense_details(&expense, &user_names(storage)?, settings));
        }

        ExpenseCommands::Delete { id, force } => {
            let expense = service.resolve(&id)?;

            if !force {
                println!("About to delete expense: {}", expense);
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let deleted = service.delete(expense.id)?;
            println!("Deleted expense: {}", deleted);
        }
    }

    Ok(())
}

/// Username lookup for display
pub(crate) fn user_names(storage: &Storage) -> ShareResult<UserNames> {
    Ok(storage
        .users
        .get_all()?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect())
}

fn parse_method(s: &str) -> ShareResult<SplitMethod> {
    s.parse::<SplitMethod>()
        .map_err(|_| ShareError::Validation(format!("Unknown split method: {}", s)))
}

fn parse_amount(s: &str) -> ShareResult<Money> {
    Money::parse(s).map_err(|e| ShareError::Validation(e.to_string()))
}

fn parse_date(s: Option<&str>) -> ShareResult<NaiveDate> {
    match s {
        None => Ok(Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            ShareError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", s))
        }),
    }
}

/// Split `USER=VALUE` into its parts; the value is optional
fn split_participant_spec(spec: &str) -> (&str, Option<&str>) {
    match spec.rsplit_once('=') {
        Some((user, value)) => (user.trim(), Some(value.trim())),
        None => (spec.trim(), None),
    }
}

/// Build calculator input for one participant
///
/// A value is read as the field `method` expects. With an equal split a
/// value is still passed along, as whichever field it parses as, so the
/// calculator rejects it. Only a value that is neither an amount nor a
/// percentage fails here.
fn participant_input(
    id: UserId,
    value: Option<&str>,
    method: SplitMethod,
) -> ShareResult<ParticipantInput> {
    let Some(value) = value else {
        return Ok(ParticipantInput::equal(id));
    };

    match method {
        SplitMethod::Exact => Ok(ParticipantInput::exact(id, parse_amount(value)?)),
        SplitMethod::Percentage => Ok(ParticipantInput::percentage(id, parse_percentage(value)?)),
        SplitMethod::Equal => {
            if value.ends_with('%') {
                return Ok(ParticipantInput::percentage(id, parse_percentage(value)?));
            }
            match Money::parse(value) {
                Ok(amount) => Ok(ParticipantInput::exact(id, amount)),
                Err(_) => Ok(ParticipantInput::percentage(id, parse_percentage(value)?)),
            }
        }
    }
}

fn parse_percentage(s: &str) -> ShareResult<Percentage> {
    Percentage::parse(s).map_err(|e| ShareError::Validation(e.to_string()))
}

fn resolve_participants(
    users: &UserService<'_>,
    specs: &[String],
    method: SplitMethod,
) -> ShareResult<Vec<ParticipantInput>> {
    specs
        .iter()
        .map(|spec| {
            let (name, value) = split_participant_spec(spec);
            let user = users.resolve(name)?;
            participant_input(user.id, value, method)
        })
        .collect()
}
