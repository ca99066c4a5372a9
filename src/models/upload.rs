//! Upload models

use serde::Serialize;
use utoipa::ToSchema;

/// Multipart body of an upload request
#[derive(Debug, ToSchema)]
pub struct UploadForm {
    #[schema(value_type = Vec<String>, format = Binary)]
    pub files: Vec<Vec<u8>>,
}

/// One stored file
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadedFile {
    pub originalname: String,
    /// Storage identifier (public id or file name)
    pub filename: String,
    /// Publicly fetchable URL
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub files: Vec<UploadedFile>,
}

/// Failure to remove one stored image
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageDeleteError {
    pub url: String,
    pub error: String,
}

/// Result of best-effort image cleanup
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ImageDeleteReport {
    pub deleted: Vec<String>,
    pub errors: Vec<ImageDeleteError>,
}
