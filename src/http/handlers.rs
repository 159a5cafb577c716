//! HTTP endpoint handlers.
//!
//! - `GET /health` - Liveness check
//! - `POST /create-schema/` - Create a schema if absent
//! - `POST /create-table/` - Create a table if absent
//! - `POST /upload-csv/` - Load a CSV file into a table
//! - `POST /validate-csv/` - Compare a CSV header with a table's columns
//! - `GET /reports/?db_name=` - List user-defined views

use crate::db::CatalogInspector;
use crate::error::{AdminError, AdminResult};
use crate::http::AppState;
use crate::ingest::{CsvOptions, validate_csv_columns};
use crate::models::{
    ColumnValidation, MessageResponse, SchemaParameters, TableDefinition, TableParameters,
    ViewInfo,
};
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Multipart field holding the CSV bytes.
pub const FILE_FIELD: &str = "file";
/// Multipart field holding the `TableParameters` JSON text.
pub const TABLE_PARAMS_FIELD: &str = "table_params";
/// Optional multipart field: `true` when the first line is a header.
pub const HAS_HEADER_FIELD: &str = "has_header";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ReportsQuery {
    pub db_name: String,
}

/// Fields of an upload form.
#[derive(Debug)]
pub struct CsvUpload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
    pub table_params: TableParameters,
    pub options: CsvOptions,
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn create_schema(
    State(state): State<AppState>,
    payload: Result<Json<SchemaParameters>, JsonRejection>,
) -> AdminResult<Json<MessageResponse>> {
    let Json(params) = payload.map_err(json_rejection)?;
    let result = state.ddl.create_schema(&params).await;
    logged("create_schema", result).map(Json)
}

pub async fn create_table(
    State(state): State<AppState>,
    payload: Result<Json<TableDefinition>, JsonRejection>,
) -> AdminResult<Json<MessageResponse>> {
    let Json(definition) = payload.map_err(json_rejection)?;
    let result = state.ddl.create_table(&definition).await;
    logged("create_table", result).map(Json)
}

pub async fn upload_csv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AdminResult<Json<MessageResponse>> {
    let upload = logged("upload_csv", read_upload(multipart).await)?;
    debug!(
        file = ?upload.file_name,
        bytes = upload.bytes.len(),
        table = %upload.table_params,
        has_header = upload.options.has_header,
        "Received CSV upload"
    );

    let result = state
        .loader
        .load(&upload.bytes, &upload.table_params, upload.options)
        .await;
    let report = logged("upload_csv", result)?;

    Ok(Json(
        MessageResponse::new("CSV file successfully loaded into the database.")
            .with_rows_inserted(report.rows_inserted),
    ))
}

pub async fn validate_csv(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AdminResult<Json<ColumnValidation>> {
    let upload = logged("validate_csv", read_upload(multipart).await)?;
    let result = validate_csv_columns(&state.factory, &upload.bytes, &upload.table_params).await;
    logged("validate_csv", result).map(Json)
}

pub async fn reports(
    State(state): State<AppState>,
    query: Result<Query<ReportsQuery>, QueryRejection>,
) -> AdminResult<Json<Vec<ViewInfo>>> {
    let Query(query) = query.map_err(|e| AdminError::validation(e.body_text()))?;
    if query.db_name.trim().is_empty() {
        return Err(AdminError::validation("db_name must not be empty"));
    }
    let result = CatalogInspector::fetch_views(&state.factory, &query.db_name).await;
    logged("fetch_views", result).map(Json)
}

/// Collect the upload form fields. Unknown fields are ignored.
pub async fn read_upload(mut multipart: Multipart) -> AdminResult<CsvUpload> {
    let mut file: Option<(Option<String>, Vec<u8>)> = None;
    let mut table_params: Option<String> = None;
    let mut has_header = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AdminError::validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            FILE_FIELD => {
                let file_name = field.file_name().map(String::from);
                let bytes = field.bytes().await.map_err(|e| {
                    AdminError::validation(format!("Failed to read uploaded file: {}", e))
                })?;
                file = Some((file_name, bytes.to_vec()));
            }
            TABLE_PARAMS_FIELD => {
                table_params = Some(field.text().await.map_err(|e| {
                    AdminError::validation(format!("Failed to read table_params: {}", e))
                })?);
            }
            HAS_HEADER_FIELD => {
                let value = field.text().await.map_err(|e| {
                    AdminError::validation(format!("Failed to read has_header: {}", e))
                })?;
                has_header = parse_flag(&value)?;
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AdminError::validation("Missing 'file' field in upload form"))?;
    let table_params = table_params
        .ok_or_else(|| AdminError::validation("Missing 'table_params' field in upload form"))?;

    Ok(CsvUpload {
        file_name,
        bytes,
        table_params: TableParameters::from_json(&table_params)?,
        options: CsvOptions { has_header },
    })
}

fn parse_flag(value: &str) -> AdminResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(AdminError::validation(format!(
            "has_header must be true or false, got '{}'",
            other
        ))),
    }
}

fn json_rejection(rejection: JsonRejection) -> AdminError {
    AdminError::validation(rejection.body_text())
}

/// Log a failed operation at a level matching who caused it.
fn logged<T>(operation: &'static str, result: AdminResult<T>) -> AdminResult<T> {
    if let Err(e) = &result {
        if e.is_client_error() {
            warn!(operation, error = %e, "Request rejected");
        } else {
            error!(operation, error = %e, "Request failed");
        }
    }
    result
}
