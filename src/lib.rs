//! PostgreSQL admin API library.
//!
//! An HTTP service that creates schemas and tables, loads CSV files into
//! tables inside a single transaction, and lists user-defined views.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod ingest;
pub mod models;

pub use config::{Config, ServerConfig};
pub use error::{AdminError, AdminResult};
pub use http::{AppState, HttpServer, router};
