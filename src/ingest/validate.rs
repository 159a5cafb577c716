//! Header check for uploads.
//!
//! Unlike [`CsvLoader::load`](super::CsvLoader::load), this check reads the first
//! line as a header and compares its names with the table's columns as sets, so
//! column order is ignored. It never writes to the table.

use crate::db::{CatalogInspector, ConnectionFactory};
use crate::error::{AdminError, AdminResult};
use crate::ingest::loader::require_columns;
use crate::ingest::reader::{CsvOptions, parse_csv};
use crate::models::{ColumnValidation, TableParameters};
use std::collections::BTreeSet;
use tracing::info;

/// Compare header names with table columns, ignoring order.
pub fn compare_columns(csv_columns: Vec<String>, table_columns: Vec<String>) -> ColumnValidation {
    let csv_set: BTreeSet<&str> = csv_columns.iter().map(String::as_str).collect();
    let table_set: BTreeSet<&str> = table_columns.iter().map(String::as_str).collect();
    let matches = csv_set == table_set;

    let message = if matches {
        "CSV columns match the table columns.".to_string()
    } else {
        format!(
            "CSV columns do not match table columns.\nCSV: {:?}\nTable: {:?}",
            csv_columns, table_columns
        )
    };

    ColumnValidation {
        matches,
        message,
        csv_columns,
        table_columns,
    }
}

/// Check an upload's header row against the target table.
pub async fn validate_csv_columns(
    factory: &ConnectionFactory,
    bytes: &[u8],
    params: &TableParameters,
) -> AdminResult<ColumnValidation> {
    params.validate()?;

    let parsed = parse_csv(bytes, CsvOptions::with_header())?;
    let csv_columns = parsed
        .header
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AdminError::validation("CSV file has no header row"))?;

    let lookup = CatalogInspector::get_columns_from_table(factory, params).await;
    let table_columns = require_columns(lookup, params)?
        .into_iter()
        .map(|c| c.column_name)
        .collect();

    let validation = compare_columns(csv_columns, table_columns);
    info!(table = %params, matches = validation.matches, "Validated CSV header");
    Ok(validation)
}
