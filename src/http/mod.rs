//! HTTP API surface.
//!
//! Handlers translate requests into the typed parameter models, call the DDL
//! service, catalog inspector or CSV loader, and serialize results or errors.
//! Each request opens and closes its own database connection; the shared state
//! only carries configuration.

pub mod handlers;
pub mod server;

pub use server::HttpServer;

use crate::db::{ColumnTypePolicy, ConnectionFactory, DdlService};
use crate::ingest::CsvLoader;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub factory: Arc<ConnectionFactory>,
    pub ddl: Arc<DdlService>,
    pub loader: Arc<CsvLoader>,
}

impl AppState {
    pub fn new(factory: ConnectionFactory, policy: ColumnTypePolicy) -> Self {
        Self {
            ddl: Arc::new(DdlService::new(factory.clone(), policy)),
            loader: Arc::new(CsvLoader::new(factory.clone())),
            factory: Arc::new(factory),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/create-schema/", post(handlers::create_schema))
        .route("/create-table/", post(handlers::create_table))
        .route("/upload-csv/", post(handlers::upload_csv))
        .route("/validate-csv/", post(handlers::validate_csv))
        .route("/reports/", get(handlers::reports))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
