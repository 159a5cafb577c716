//! Data models for the PostgreSQL admin API.
//!
//! This module re-exports all model types used throughout the application.

pub mod catalog;
pub mod params;
pub mod response;

// Re-export commonly used types
pub use catalog::{ColumnLookup, TableColumn, ViewInfo};
pub use params::{ColumnMap, SchemaParameters, TableDefinition, TableParameters};
pub use response::{ColumnValidation, MessageResponse};
