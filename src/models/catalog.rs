//! Catalog data models.

use serde::{Deserialize, Serialize};

/// A user-defined view, as listed by `information_schema.views`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ViewInfo {
    pub table_schema: String,
    pub table_name: String,
}

/// A table column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TableColumn {
    pub column_name: String,
    /// Base type without modifiers, as rendered by `format_type`, e.g. `character varying`.
    pub data_type: String,
}

impl TableColumn {
    pub fn new(column_name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
            data_type: data_type.into(),
        }
    }
}

/// Outcome of resolving a table's column names.
///
/// A missing table and a failed lookup are expected outcomes here, not errors:
/// callers turn them into a validation error before touching any row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnLookup {
    /// Columns in catalog (ordinal) order. Never empty.
    Found(Vec<TableColumn>),
    /// The catalog has no columns for this schema and table.
    NotFound,
    /// The catalog query itself failed.
    Failed { reason: String },
}

impl ColumnLookup {
    /// Wrap catalog rows, mapping an empty result to `NotFound`.
    pub fn from_columns(columns: Vec<TableColumn>) -> Self {
        if columns.is_empty() {
            Self::NotFound
        } else {
            Self::Found(columns)
        }
    }

    pub fn columns(&self) -> Option<&[TableColumn]> {
        match self {
            Self::Found(columns) => Some(columns),
            _ => None,
        }
    }

    /// Column names in catalog order, or `None` when the lookup found nothing.
    pub fn names(&self) -> Option<Vec<String>> {
        self.columns()
            .map(|columns| columns.iter().map(|c| c.column_name.clone()).collect())
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}
