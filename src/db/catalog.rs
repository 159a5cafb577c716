//! Catalog inspection.
//!
//! Column lookups are soft: a failed or empty lookup comes back as a
//! [`ColumnLookup`] variant so the caller can report a clean validation error.
//! View listing is hard: failures propagate as errors.

use crate::db::connection::{ConnectionFactory, close_quietly};
use crate::error::AdminResult;
use crate::models::{ColumnLookup, TableColumn, TableParameters, ViewInfo};
use sqlx::PgConnection;
use tracing::{debug, warn};

// =============================================================================
// SQL Query Templates
// =============================================================================

mod queries {
    // A typmod of -1 renders unconstrained names (`bpchar`, `"bit"`) rather than
    // `character` / `bit`, which mean length 1. Length and precision are enforced
    // when the value is assigned to the column.
    pub const TABLE_COLUMNS: &str = r#"
        SELECT
            c.column_name::text AS column_name,
            format_type(a.atttypid, -1) AS data_type
        FROM information_schema.columns c
        JOIN pg_namespace n ON n.nspname = c.table_schema
        JOIN pg_class t ON t.relnamespace = n.oid AND t.relname = c.table_name
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attname = c.column_name
        WHERE c.table_schema = $1
        AND c.table_name = $2
        ORDER BY c.ordinal_position
        "#;

    pub const USER_VIEWS: &str = r#"
        SELECT
            table_schema::text AS table_schema,
            table_name::text AS table_name
        FROM information_schema.views
        WHERE table_schema NOT IN ('pg_catalog', 'information_schema')
        ORDER BY table_schema, table_name
        "#;
}

/// Catalog inspector for column and view introspection.
pub struct CatalogInspector;

impl CatalogInspector {
    /// Resolve a table's columns on an already open connection.
    pub async fn columns_for_table(
        conn: &mut PgConnection,
        params: &TableParameters,
    ) -> ColumnLookup {
        let result = sqlx::query_as::<_, TableColumn>(queries::TABLE_COLUMNS)
            .bind(params.schema_name())
            .bind(&params.table_name)
            .fetch_all(&mut *conn)
            .await;

        match result {
            Ok(columns) => {
                debug!(table = %params, columns = columns.len(), "Resolved table columns");
                ColumnLookup::from_columns(columns)
            }
            Err(e) => {
                warn!(table = %params, error = %e, "Failed to read table columns");
                ColumnLookup::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Resolve a table's columns on a fresh connection.
    ///
    /// Connection failures are reported as `Failed` as well.
    pub async fn get_columns_from_table(
        factory: &ConnectionFactory,
        params: &TableParameters,
    ) -> ColumnLookup {
        let mut conn = match factory.connect(params.db_name()).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(table = %params, error = %e, "Failed to connect for column lookup");
                return ColumnLookup::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let lookup = Self::columns_for_table(&mut conn, params).await;
        close_quietly(conn).await;
        lookup
    }

    /// List views outside the system schemas, sorted by schema then name.
    pub async fn list_views(conn: &mut PgConnection) -> AdminResult<Vec<ViewInfo>> {
        let views = sqlx::query_as::<_, ViewInfo>(queries::USER_VIEWS)
            .fetch_all(&mut *conn)
            .await?;
        Ok(views)
    }

    /// List user-defined views of `db_name` on a fresh connection.
    pub async fn fetch_views(
        factory: &ConnectionFactory,
        db_name: &str,
    ) -> AdminResult<Vec<ViewInfo>> {
        let mut conn = factory.connect(db_name).await?;
        let result = Self::list_views(&mut conn).await;
        close_quietly(conn).await;

        let views = result?;
        debug!(db_name = %db_name, count = views.len(), "Listed views");
        Ok(views)
    }
}
