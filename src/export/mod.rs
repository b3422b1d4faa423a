//! Export module for SplitShare
//!
//! - CSV: balance sheet and per-allocation expense ledger (spreadsheet-compatible)
//! - JSON: machine-readable full export
//! - YAML: human-readable full export

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::{export_balance_sheet_csv, export_expenses_csv};
pub use json::{export_full_json, import_from_json, FullExport, EXPORT_SCHEMA_VERSION};
pub use yaml::{export_full_yaml, import_from_yaml};
