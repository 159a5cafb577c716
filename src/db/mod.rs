//! Database access layer.
//!
//! This module provides database access functionality:
//! - Per-request connections to a named database
//! - Identifier quoting for generated SQL
//! - Column type declaration policy
//! - Schema and table creation
//! - Catalog inspection (columns, views)

pub mod catalog;
pub mod column_type;
pub mod connection;
pub mod ddl;
pub mod ident;

pub use catalog::CatalogInspector;
pub use column_type::ColumnTypePolicy;
pub use connection::ConnectionFactory;
pub use ddl::DdlService;
pub use ident::{qualified_name, quote_ident};
