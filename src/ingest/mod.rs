//! CSV ingestion.
//!
//! - `reader`: UTF-8 decoding, CSV parsing, missing-value normalization
//! - `loader`: all-or-nothing row-by-row inserts in one transaction
//! - `validate`: header-row comparison against the table's columns

pub mod loader;
pub mod reader;
pub mod validate;

pub use loader::{CsvLoader, LoadReport, build_insert_sql};
pub use reader::{CsvOptions, CsvRow, ParsedCsv, normalize_cell, parse_csv};
pub use validate::{compare_columns, validate_csv_columns};
