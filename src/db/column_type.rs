//! Column type declarations for `CREATE TABLE`.
//!
//! Type declarations are SQL text supplied by the caller (`INTEGER`,
//! `VARCHAR(20) NOT NULL`, `NUMERIC(10, 2) PRIMARY KEY`, ...). They cannot be bound
//! as parameters, so they reach the statement as written. Under
//! [`ColumnTypePolicy::Trusted`] the caller is trusted with arbitrary type syntax,
//! constraints included. [`ColumnTypePolicy::AllowList`] restricts declarations to
//! known type names and constraint keywords and confirms, with `sqlparser`, that the
//! declaration cannot introduce a second column or statement.

use crate::error::{AdminError, AdminResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use sqlparser::ast::Statement;
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// How column type declarations are checked before they reach the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ColumnTypePolicy {
    /// Declarations are inserted verbatim. The caller is a trusted administrator.
    #[default]
    Trusted,
    /// Only known type names, constraint keywords and numeric modifiers are accepted.
    AllowList,
}

impl std::fmt::Display for ColumnTypePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trusted => write!(f, "trusted"),
            Self::AllowList => write!(f, "allow-list"),
        }
    }
}

const ALLOWED_WORDS: &[&str] = &[
    // numeric
    "smallint", "integer", "int", "int2", "int4", "int8", "bigint", "decimal", "numeric",
    "real", "double", "precision", "float", "float4", "float8", "smallserial", "serial",
    "bigserial", "serial2", "serial4", "serial8", "money",
    // character
    "text", "varchar", "character", "varying", "char", "bpchar", "citext",
    // binary / boolean
    "bytea", "boolean", "bool", "bit", "varbit",
    // date / time
    "date", "time", "timestamp", "timestamptz", "timetz", "interval", "with", "without",
    "zone",
    // other scalar types
    "uuid", "json", "jsonb", "xml", "inet", "cidr", "macaddr", "macaddr8", "tsvector",
    "tsquery", "point", "line", "lseg", "box", "path", "polygon", "circle",
    // column constraints
    "primary", "key", "not", "null", "unique", "default", "true", "false", "generated",
    "always", "by", "as", "identity",
];

impl ColumnTypePolicy {
    /// Check a declaration for `column` and return the text to emit.
    pub fn check<'a>(&self, column: &str, declaration: &'a str) -> AdminResult<&'a str> {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            return Err(AdminError::validation(format!(
                "Column '{}' has an empty type declaration",
                column
            )));
        }

        match self {
            Self::Trusted => Ok(declaration),
            Self::AllowList => {
                check_allowed_tokens(column, declaration)?;
                check_single_column(column, declaration)?;
                Ok(declaration)
            }
        }
    }
}

fn check_allowed_tokens(column: &str, declaration: &str) -> AdminResult<()> {
    if let Some(c) = declaration.chars().find(|c| {
        !(c.is_ascii_alphanumeric()
            || c.is_ascii_whitespace()
            || matches!(c, '_' | '(' | ')' | ',' | '[' | ']'))
    }) {
        return Err(AdminError::validation(format!(
            "Column '{}': character {:?} is not allowed in a type declaration",
            column, c
        )));
    }

    for word in declaration
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
    {
        if word.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let lower = word.to_ascii_lowercase();
        if !ALLOWED_WORDS.contains(&lower.as_str()) {
            return Err(AdminError::validation(format!(
                "Column '{}': '{}' is not an allowed type or constraint keyword",
                column, word
            )));
        }
    }
    Ok(())
}

/// Parse `CREATE TABLE t (c <declaration>)` and require exactly one statement with one column.
fn check_single_column(column: &str, declaration: &str) -> AdminResult<()> {
    let probe = format!("CREATE TABLE t (c {})", declaration);
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, &probe).map_err(|e| {
        AdminError::validation(format!(
            "Column '{}': invalid type declaration '{}': {}",
            column, declaration, e
        ))
    })?;

    match statements.as_slice() {
        [Statement::CreateTable(create)] if create.columns.len() == 1 => Ok(()),
        _ => Err(AdminError::validation(format!(
            "Column '{}': type declaration '{}' must describe exactly one column",
            column, declaration
        ))),
    }
}
