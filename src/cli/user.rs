//! User CLI commands

use clap::Subcommand;

use crate::display::{format_user_details, format_user_list};
use crate::error::ShareResult;
use crate::services::UserService;
use crate::storage::Storage;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user
    Add {
        /// Unique username
        username: String,
        /// Mobile number (digits, optional leading +, at most 15 characters)
        #[arg(short, long)]
        mobile: String,
        /// Email address
        #[arg(short, long)]
        email: Option<String>,
    },
    /// List all users
    List,
    /// Show user details
    Show {
        /// Username or ID
        user: String,
    },
}

/// Handle a user command
pub fn handle_user_command(storage: &Storage, cmd: UserCommands) -> ShareResult<()> {
    let service = UserService::new(storage);

    match cmd {
        UserCommands::Add {
            username,
            mobile,
            email,
        } => {
            let user = service.register(&username, email.as_deref(), &mobile)?;
            println!("Registered user: {} ({})", user.username, user.id);
        }

        UserCommands::List => {
            let users = service.list()?;
            print!("{}", format_user_list(&users));
            if !users.is_empty() {
                println!("\nTotal: {} users", users.len());
            } else {
                println!();
            }
        }

        UserCommands::Show { user } => {
            let user = service.resolve(&user)?;
            print!("{}", format_user_details(&user));
        }
    }

    Ok(())
}
