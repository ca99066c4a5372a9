//! JSON snapshot of the publications table
//!
//! The front end can read `all-publications.json` as a static fallback
//! when the API is unavailable, so it is rewritten after every change.

use std::path::PathBuf;

use crate::{
    config::ExportConfig,
    error::{AppError, AppResult},
    repository::Repository,
};

#[derive(Clone)]
pub struct ExportService {
    repository: Repository,
    path: PathBuf,
}

impl ExportService {
    pub fn new(repository: Repository, config: &ExportConfig) -> Self {
        Self {
            repository,
            path: config.snapshot_path(),
        }
    }

    /// Rewrite the snapshot, returning the number of exported publications.
    pub async fn export(&self) -> AppResult<usize> {
        let publications = self.repository.publications_export().await?;
        let json = serde_json::to_vec_pretty(&publications)
            .map_err(|e| AppError::Internal(format!("Cannot serialize snapshot: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Cannot create {}: {}", parent.display(), e)))?;
        }

        // Replaced by rename, never written in place
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot replace {}: {}", self.path.display(), e)))?;

        tracing::info!("Exported {} publications to {}", publications.len(), self.path.display());
        Ok(publications.len())
    }

    /// Export after a write; failures are logged, the write already happened.
    pub async fn refresh(&self) {
        if let Err(e) = self.export().await {
            tracing::warn!("Snapshot export failed: {}", e);
        }
    }
}
