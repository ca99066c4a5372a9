//! Maintenance endpoints: bibliographic import and JSON snapshot export

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::import_report::ImportReport, AppState};

#[derive(Serialize, ToSchema)]
pub struct ExportResponse {
    pub message: String,
    /// Number of publications written
    pub exported: usize,
}

/// Import publications from the facility bibliography
#[utoipa::path(
    post,
    path = "/import",
    tag = "admin",
    responses(
        (status = 200, description = "Import report", body = ImportReport),
        (status = 502, description = "Bibliography unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn import_publications(State(state): State<AppState>) -> AppResult<Json<ImportReport>> {
    let report = state.services.import.run().await?;
    Ok(Json(report))
}

/// Write the JSON snapshot of the database
#[utoipa::path(
    post,
    path = "/export-database",
    tag = "admin",
    responses(
        (status = 200, description = "Snapshot written", body = ExportResponse),
        (status = 500, description = "Export failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn export_database(State(state): State<AppState>) -> AppResult<Json<ExportResponse>> {
    let exported = state.services.export.export().await?;
    Ok(Json(ExportResponse {
        message: "Database exported successfully".to_string(),
        exported,
    }))
}
