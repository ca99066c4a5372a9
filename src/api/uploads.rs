//! Image upload endpoint

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;

use crate::{
    error::{AppError, AppResult},
    models::upload::{UploadForm, UploadResponse, UploadedFile},
    AppState,
};

/// Multipart field carrying the images
const FILES_FIELD: &str = "files";

/// Upload one or more images
#[utoipa::path(
    post,
    path = "/upload",
    tag = "uploads",
    request_body(
        content = UploadForm,
        content_type = "multipart/form-data",
        description = "Images under the `files` field"
    ),
    responses(
        (status = 200, description = "Files stored", body = UploadResponse),
        (status = 400, description = "No files uploaded", body = crate::error::ErrorResponse),
        (status = 502, description = "Storage backend failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
        if bytes.is_empty() {
            continue;
        }

        let size = bytes.len() as u64;
        let stored = state.services.storage.store(&original_name, bytes.to_vec()).await?;
        tracing::debug!("Upload {} stored as {}", original_name, stored.id);

        files.push(UploadedFile {
            originalname: original_name,
            filename: stored.id,
            path: stored.url,
            size,
        });
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No files uploaded".to_string()));
    }

    Ok(Json(UploadResponse {
        message: "Files uploaded successfully".to_string(),
        files,
    }))
}
