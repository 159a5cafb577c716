//! Request parameter models.
//!
//! Every request names its target database explicitly. `TableParameters` extends
//! `SchemaParameters`, and `TableDefinition` extends `TableParameters`; serde's
//! `flatten` keeps the JSON shape flat.

use crate::error::{AdminError, AdminResult};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifies a schema in a database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaParameters {
    pub db_name: String,
    pub schema_name: String,
}

impl SchemaParameters {
    pub fn new(db_name: impl Into<String>, schema_name: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            schema_name: schema_name.into(),
        }
    }

    /// Reject blank names before any connection is opened.
    pub fn validate(&self) -> AdminResult<()> {
        require_non_empty("db_name", &self.db_name)?;
        require_non_empty("schema_name", &self.schema_name)
    }
}

/// Identifies a table within a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableParameters {
    #[serde(flatten)]
    pub schema: SchemaParameters,
    pub table_name: String,
}

impl TableParameters {
    pub fn new(
        db_name: impl Into<String>,
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            schema: SchemaParameters::new(db_name, schema_name),
            table_name: table_name.into(),
        }
    }

    pub fn db_name(&self) -> &str {
        &self.schema.db_name
    }

    pub fn schema_name(&self) -> &str {
        &self.schema.schema_name
    }

    pub fn validate(&self) -> AdminResult<()> {
        self.schema.validate()?;
        require_non_empty("table_name", &self.table_name)
    }

    /// Parse the JSON text sent in the `table_params` form field.
    pub fn from_json(text: &str) -> AdminResult<Self> {
        let params: Self = serde_json::from_str(text).map_err(|e| {
            AdminError::validation(format!("Could not interpret table_params: {}", e))
        })?;
        params.validate()?;
        Ok(params)
    }
}

impl fmt::Display for TableParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} (database '{}')",
            self.schema.schema_name, self.table_name, self.schema.db_name
        )
    }
}

/// Full table definition used for table creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    #[serde(flatten)]
    pub table: TableParameters,
    pub columns: ColumnMap,
}

impl TableDefinition {
    pub fn validate(&self) -> AdminResult<()> {
        self.table.validate()?;
        if self.columns.is_empty() {
            return Err(AdminError::validation(
                "columns must contain at least one column definition",
            ));
        }
        for (name, _) in self.columns.iter() {
            require_non_empty("column name", name)?;
        }
        Ok(())
    }
}

/// Column name to SQL type declaration, in the order the caller wrote them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap(Vec<(String, String)>);

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a column. A replaced column keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, sql_type: impl Into<String>) {
        let name = name.into();
        let sql_type = sql_type.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = sql_type,
            None => self.0.push((name, sql_type)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, t)| (n.as_str(), t.as_str()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>, T: Into<String>> FromIterator<(N, T)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (name, sql_type) in iter {
            map.insert(name, sql_type);
        }
        map
    }
}

impl Serialize for ColumnMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(n, t)| (n, t)))
    }
}

impl<'de> Deserialize<'de> for ColumnMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ColumnMapVisitor;

        impl<'de> Visitor<'de> for ColumnMapVisitor {
            type Value = ColumnMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of column names to SQL type declarations")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ColumnMap, A::Error> {
                let mut map = ColumnMap::new();
                while let Some((name, sql_type)) = access.next_entry::<String, String>()? {
                    map.insert(name, sql_type);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ColumnMapVisitor)
    }
}

fn require_non_empty(field: &str, value: &str) -> AdminResult<()> {
    if value.trim().is_empty() {
        return Err(AdminError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}
