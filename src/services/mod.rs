//! Business logic services

pub mod export;
pub mod import;
pub mod publications;
pub mod storage;
pub mod summary;

use std::sync::Arc;

use crate::{config::AppConfig, error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub publications: publications::PublicationService,
    pub storage: Arc<dyn storage::ImageStore>,
    pub summary: summary::SummaryService,
    pub import: import::ImportService,
    pub export: export::ExportService,
}

impl Services {
    /// Create all services using the configured collaborators
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        let storage: Arc<dyn storage::ImageStore> = Arc::from(storage::from_config(&config.storage)?);
        let source = Arc::new(import::HttpBibliographicSource::new(&config.import)?);
        Self::with_collaborators(repository, config, storage, source)
    }

    /// Create all services with explicit image store and bibliographic source
    pub fn with_collaborators(
        repository: Repository,
        config: &AppConfig,
        storage: Arc<dyn storage::ImageStore>,
        source: Arc<dyn import::BibliographicSource>,
    ) -> AppResult<Self> {
        let export = export::ExportService::new(repository.clone(), &config.export);

        Ok(Self {
            publications: publications::PublicationService::new(
                repository.clone(),
                storage.clone(),
                export.clone(),
            ),
            summary: summary::SummaryService::new(
                repository.clone(),
                export.clone(),
                config.summary.clone(),
            )?,
            import: import::ImportService::new(
                repository,
                source,
                export.clone(),
                config.import.beamline.clone(),
            ),
            storage,
            export,
        })
    }
}
