//! Schema and table creation.
//!
//! Both operations are idempotent (`IF NOT EXISTS`) and run on a connection opened
//! for the single call. Names are quoted identifiers; column type declarations go
//! through the configured [`ColumnTypePolicy`].

use crate::db::column_type::ColumnTypePolicy;
use crate::db::connection::{ConnectionFactory, close_quietly};
use crate::db::ident::{qualified_name, quote_ident};
use crate::error::AdminResult;
use crate::models::{MessageResponse, SchemaParameters, TableDefinition};
use sqlx::{Connection, PgConnection};
use tracing::{debug, info};

/// Build `CREATE SCHEMA IF NOT EXISTS "<schema>"`.
pub fn build_create_schema_sql(params: &SchemaParameters) -> AdminResult<String> {
    Ok(format!(
        "CREATE SCHEMA IF NOT EXISTS {}",
        quote_ident(&params.schema_name)?
    ))
}

/// Build `CREATE TABLE IF NOT EXISTS "<schema>"."<table>" ("col" type, ...)`.
///
/// Columns appear in the order of the definition.
pub fn build_create_table_sql(
    definition: &TableDefinition,
    policy: ColumnTypePolicy,
) -> AdminResult<String> {
    definition.validate()?;

    let columns = definition
        .columns
        .iter()
        .map(|(name, sql_type)| {
            let sql_type = policy.check(name, sql_type)?;
            Ok(format!("{} {}", quote_ident(name)?, sql_type))
        })
        .collect::<AdminResult<Vec<_>>>()?;

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        qualified_name(definition.table.schema_name(), &definition.table.table_name)?,
        columns.join(", ")
    ))
}

#[derive(Debug, Clone)]
pub struct DdlService {
    factory: ConnectionFactory,
    policy: ColumnTypePolicy,
}

impl DdlService {
    pub fn new(factory: ConnectionFactory, policy: ColumnTypePolicy) -> Self {
        Self { factory, policy }
    }

    /// Create a schema if it does not exist yet.
    pub async fn create_schema(&self, params: &SchemaParameters) -> AdminResult<MessageResponse> {
        params.validate()?;
        let sql = build_create_schema_sql(params)?;

        self.execute_ddl(&params.db_name, &sql).await?;

        info!(
            db_name = %params.db_name,
            schema = %params.schema_name,
            "Schema created"
        );
        Ok(MessageResponse::new(format!(
            "Schema '{}' created successfully in database '{}'.",
            params.schema_name, params.db_name
        )))
    }

    /// Create a table if it does not exist yet.
    pub async fn create_table(&self, definition: &TableDefinition) -> AdminResult<MessageResponse> {
        let sql = build_create_table_sql(definition, self.policy)?;

        self.execute_ddl(definition.table.db_name(), &sql).await?;

        info!(
            db_name = %definition.table.db_name(),
            schema = %definition.table.schema_name(),
            table = %definition.table.table_name,
            columns = definition.columns.len(),
            "Table created"
        );
        Ok(MessageResponse::new(format!(
            "Table '{}' created successfully in schema '{}'.",
            definition.table.table_name,
            definition.table.schema_name()
        )))
    }

    async fn execute_ddl(&self, db_name: &str, sql: &str) -> AdminResult<()> {
        let mut conn = self.factory.connect(db_name).await?;
        let result = run_in_transaction(&mut conn, sql).await;
        close_quietly(conn).await;
        result
    }
}

async fn run_in_transaction(conn: &mut PgConnection, sql: &str) -> AdminResult<()> {
    debug!(sql = %sql, "Executing DDL");
    let mut tx = conn.begin().await?;
    sqlx::query(sql).execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
}
