//! CLI commands for data export and import

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};

use crate::error::{ShareError, ShareResult};
use crate::export::{csv, json, yaml};
use crate::storage::Storage;

/// Full export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-readable)
    Yaml,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export the balance sheet to CSV
    BalanceSheet {
        /// Output file path
        output: PathBuf,
    },

    /// Export expenses to CSV, one row per participant
    Expenses {
        /// Output file path
        output: PathBuf,
    },

    /// Export all users and expenses
    All {
        /// Output file path
        output: PathBuf,

        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> ShareResult<()> {
    match cmd {
        ExportCommands::BalanceSheet { output } => {
            csv::export_balance_sheet_csv(storage, create_output(&output)?)?;
            let count = storage.users.count()?;
            println!("Exported balance sheet for {} users to: {}", count, output.display());
        }

        ExportCommands::Expenses { output } => {
            csv::export_expenses_csv(storage, create_output(&output)?)?;
            let count = storage.expenses.count()?;
            println!("Exported {} expenses to: {}", count, output.display());
        }

        ExportCommands::All {
            output,
            format,
            pretty,
        } => {
            let mut writer = create_output(&output)?;
            match format {
                ExportFormat::Json => json::export_full_json(storage, &mut writer, pretty)?,
                ExportFormat::Yaml => yaml::export_full_yaml(storage, &mut writer)?,
            }
            writer.flush()?;
            println!("Full export written to: {}", output.display());
        }
    }

    Ok(())
}

/// Restore all users and expenses from a full JSON or YAML export
///
/// Without `force` the file is only checked and summarized.
pub fn handle_import_command(
    storage: &Storage,
    input: &Path,
    format: Option<ExportFormat>,
    force: bool,
) -> ShareResult<()> {
    let contents = fs::read_to_string(input).map_err(|e| {
        ShareError::Io(format!("Failed to read {}: {}", input.display(), e))
    })?;

    let export = match format.unwrap_or_else(|| format_from_extension(input)) {
        ExportFormat::Json => json::import_from_json(&contents)?,
        ExportFormat::Yaml => yaml::import_from_yaml(&contents)?,
    };

    println!("Import file: {}", input.display());
    println!(
        "Exported:    {}",
        export.exported_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!(
        "Contents:    {} users, {} expenses",
        export.users.len(),
        export.expenses.len()
    );
    println!();

    if !force {
        println!("WARNING: This will replace ALL current users and expenses!");
        println!("To proceed, run again with --force flag:");
        println!("  splitshare import {} --force", input.display());
        return Ok(());
    }

    export.restore_into(storage)?;
    println!("Import complete!");

    Ok(())
}

fn format_from_extension(path: &Path) -> ExportFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            ExportFormat::Yaml
        }
        _ => ExportFormat::Json,
    }
}

fn create_output(output: &Path) -> ShareResult<BufWriter<File>> {
    let file = File::create(output).map_err(|e| {
        ShareError::Export(format!(
            "Failed to create file {}: {}",
            output.display(),
            e
        ))
    })?;
    Ok(BufWriter::new(file))
}
