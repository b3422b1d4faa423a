//! YAML Export functionality
//!
//! Exports all users and expenses to YAML for a human-readable copy.

use std::io::Write;

use crate::error::{ShareError, ShareResult};
use crate::export::json::FullExport;
use crate::storage::Storage;

/// Export the full database to YAML format
pub fn export_full_yaml<W: Write>(storage: &Storage, writer: &mut W) -> ShareResult<()> {
    let export = FullExport::from_storage(storage)?;

    writeln!(writer, "# SplitShare Full Export")?;
    writeln!(writer, "# Generated: {}", export.exported_at)?;
    writeln!(writer, "# App Version: {}", export.app_version)?;
    writeln!(writer, "# Amounts are integer cents; percentages are hundredths of a percent.")?;
    writeln!(writer)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| ShareError::Export(e.to_string()))?;

    Ok(())
}

/// Parse and verify a YAML export
pub fn import_from_yaml(yaml_str: &str) -> ShareResult<FullExport> {
    let export: FullExport =
        serde_yaml::from_str(yaml_str).map_err(|e| ShareError::Validation(e.to_string()))?;
    export.validate().map_err(ShareError::Validation)?;
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::SplitSharePaths;
    use crate::models::{Money, ParticipantInput, SplitMethod, User};
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

    #[test]
    fn test_yaml_export() {
        let (_temp_dir, storage) = create_test_storage();
        let carol = User::new("carol", "5550000");
        storage.users.upsert(carol.clone()).unwrap();
        ExpenseService::new(&storage)
            .create(
                carol.id,
                NewExpense {
                    title: "Concert tickets".into(),
                    amount: Money::from_cents(12000),
                    date: NaiveDate::from_ymd_opt(2024, 9, 9).unwrap(),
                    split_method: SplitMethod::Exact,
                    participants: vec![ParticipantInput::exact(
                        carol.id,
                        Money::from_cents(12000),
                    )],
                },
            )
            .unwrap();

        let mut yaml_output = Vec::new();
        export_full_yaml(&storage, &mut yaml_output).unwrap();
        let yaml_string = String::from_utf8(yaml_output).unwrap();

        assert!(yaml_string.starts_with("# SplitShare Full Export"));
        assert!(yaml_string.contains("carol"));
        assert!(yaml_string.contains("Concert tickets"));

        // comment lines are ignored by the parser
        let imported = import_from_yaml(&yaml_string).unwrap();
        assert_eq!(imported.expenses.len(), 1);
        assert_eq!(imported.expenses[0].split_method, SplitMethod::Exact);
    }
}
