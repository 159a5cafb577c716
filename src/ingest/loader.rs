//! Transactional CSV loading.
//!
//! A load uses one connection and one transaction. The table's columns are read
//! from the catalog, a single INSERT is prepared in catalog order, and every row is
//! checked and inserted in file order. Nothing is committed unless every row
//! succeeds: any error drops the open transaction, which rolls it back.

use crate::db::CatalogInspector;
use crate::db::connection::{ConnectionFactory, close_quietly};
use crate::db::ident::{qualified_name, quote_ident};
use crate::error::{AdminError, AdminResult};
use crate::ingest::reader::{CsvOptions, CsvRow, parse_csv};
use crate::models::{ColumnLookup, TableColumn, TableParameters};
use sqlx::{Connection, PgConnection};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Summary of a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_inserted: u64,
    pub elapsed_ms: u64,
}

/// Build `INSERT INTO "schema"."table" ("c1", ...) VALUES ($1::type, ...)`.
///
/// Values are bound as text; each placeholder is cast to its column's unconstrained
/// type (`bpchar`, not `character`) so the server parses the text the same way it
/// would parse a literal and length checks happen on assignment.
pub fn build_insert_sql(params: &TableParameters, columns: &[TableColumn]) -> AdminResult<String> {
    if columns.is_empty() {
        return Err(AdminError::validation(format!(
            "No columns to insert into for {}",
            params
        )));
    }

    let names = columns
        .iter()
        .map(|c| quote_ident(&c.column_name))
        .collect::<AdminResult<Vec<_>>>()?;
    let placeholders: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("${}::{}", i + 1, c.data_type))
        .collect();

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        qualified_name(params.schema_name(), &params.table_name)?,
        names.join(", "),
        placeholders.join(", ")
    ))
}

/// Reject a row whose width differs from the table's column count.
pub fn check_row_shape(
    row_number: usize,
    row: &CsvRow,
    expected: usize,
    params: &TableParameters,
) -> AdminResult<()> {
    if row.len() != expected {
        return Err(AdminError::validation(format!(
            "Row {} has {} cells but table {} has {} columns",
            row_number,
            row.len(),
            params,
            expected
        )));
    }
    Ok(())
}

/// Turn a column lookup into the columns to load, or a validation error.
pub fn require_columns(
    lookup: ColumnLookup,
    params: &TableParameters,
) -> AdminResult<Vec<TableColumn>> {
    match lookup {
        ColumnLookup::Found(columns) => Ok(columns),
        ColumnLookup::NotFound => Err(AdminError::validation(format!(
            "Unable to retrieve table columns: table {} does not exist or has no columns",
            params
        ))),
        ColumnLookup::Failed { reason } => Err(AdminError::validation(format!(
            "Unable to retrieve table columns for {}: {}",
            params, reason
        ))),
    }
}

#[derive(Debug, Clone)]
pub struct CsvLoader {
    factory: ConnectionFactory,
}

impl CsvLoader {
    pub fn new(factory: ConnectionFactory) -> Self {
        Self { factory }
    }

    /// Load an uploaded file into `params`' table, all rows or none.
    pub async fn load(
        &self,
        bytes: &[u8],
        params: &TableParameters,
        options: CsvOptions,
    ) -> AdminResult<LoadReport> {
        params.validate()?;
        let start = Instant::now();

        let parsed = parse_csv(bytes, options)?;

        let mut conn = self.factory.connect(params.db_name()).await?;
        let result = insert_rows(&mut conn, params, &parsed.rows).await;
        close_quietly(conn).await;

        let rows_inserted = match result {
            Ok(rows) => rows,
            Err(e) => {
                warn!(table = %params, error = %e, "CSV load aborted, transaction rolled back");
                return Err(e);
            }
        };

        let report = LoadReport {
            rows_inserted,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            db_name = %params.db_name(),
            schema = %params.schema_name(),
            table = %params.table_name,
            rows = report.rows_inserted,
            elapsed_ms = report.elapsed_ms,
            "CSV file loaded"
        );
        Ok(report)
    }
}

async fn insert_rows(
    conn: &mut PgConnection,
    params: &TableParameters,
    rows: &[CsvRow],
) -> AdminResult<u64> {
    let lookup = CatalogInspector::columns_for_table(conn, params).await;
    let columns = require_columns(lookup, params)?;
    let sql = build_insert_sql(params, &columns)?;
    debug!(sql = %sql, rows = rows.len(), "Prepared insert statement");

    let mut tx = conn.begin().await?;
    let mut inserted = 0u64;

    for (index, row) in rows.iter().enumerate() {
        check_row_shape(index + 1, row, columns.len(), params)?;

        let mut query = sqlx::query(&sql);
        for cell in row {
            query = query.bind(cell.as_deref());
        }
        query.execute(&mut *tx).await.map_err(|e| row_error(index + 1, e))?;
        inserted += 1;
    }

    tx.commit().await?;
    Ok(inserted)
}

fn row_error(row_number: usize, err: sqlx::Error) -> AdminError {
    match AdminError::from(err) {
        AdminError::Database {
            message,
            sql_state,
            suggestion,
        } => AdminError::database(
            format!("Row {}: {}", row_number, message),
            sql_state,
            suggestion,
        ),
        other => other,
    }
}
