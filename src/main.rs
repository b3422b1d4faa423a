use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use splitshare_cli::cli::{
    handle_balance_command, handle_expense_command, handle_export_command, handle_import_command,
    handle_user_command, ExportFormat,
};
use splitshare_cli::config::{paths::SplitSharePaths, settings::Settings};
use splitshare_cli::storage::Storage;

/// Environment variable holding a `tracing` filter directive
const LOG_ENV: &str = "SPLITSHARE_LOG";

#[derive(Parser)]
#[command(
    name = "splitshare",
    version,
    about = "Track shared expenses and who owes whom",
    long_about = "SplitShare records shared expenses, splits them equally, by exact \
                  amounts, or by percentage, and keeps running balances between \
                  everyone involved."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    #[command(subcommand)]
    User(splitshare_cli::cli::UserCommands),

    /// Expense management commands
    #[command(subcommand, alias = "exp")]
    Expense(splitshare_cli::cli::ExpenseCommands),

    /// Balance and totals
    #[command(subcommand)]
    Balance(splitshare_cli::cli::BalanceCommands),

    /// Export data to CSV, JSON, or YAML
    #[command(subcommand)]
    Export(splitshare_cli::cli::ExportCommands),

    /// Replace all data with a full JSON or YAML export
    Import {
        /// Export file to restore
        file: PathBuf,

        /// File format (default: from the file extension)
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        /// Replace current data without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_logging(settings: &Settings) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = SplitSharePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_logging(&settings);

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::User(cmd)) => handle_user_command(&storage, cmd)?,
        Some(Commands::Expense(cmd)) => handle_expense_command(&storage, &settings, cmd)?,
        Some(Commands::Balance(cmd)) => handle_balance_command(&storage, &settings, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&storage, cmd)?,
        Some(Commands::Import { file, format, force }) => {
            handle_import_command(&storage, &file, format, force)?
        }
        Some(Commands::Init) => {
            println!("Initializing SplitShare at: {}", paths.base_dir().display());
            splitshare_cli::storage::initialize_storage(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Next steps:");
            println!("  splitshare user add <name> --mobile <number>");
            println!("  splitshare expense add <title> <amount> --payer <name> -p <name> ...");
        }
        Some(Commands::Config) => {
            println!("SplitShare Configuration");
            println!("========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!(
                "Initialized:      {}",
                if paths.is_initialized() { "yes" } else { "no" }
            );
            println!();
            println!("Settings:");
            println!("  Currency symbol:    {}", settings.currency_symbol);
            println!("  Date format:        {}", settings.date_format);
            println!("  Hide zero balances: {}", settings.hide_zero_balances);
            println!("  Log filter:         {}", settings.log_filter);
        }
        None => {
            println!("SplitShare - shared expense tracking");
            println!();
            println!("Run 'splitshare --help' for usage information.");
        }
    }

    Ok(())
}
