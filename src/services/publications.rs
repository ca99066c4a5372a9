//! Publication management service

use std::sync::Arc;

use validator::Validate;

use super::{
    export::ExportService,
    storage::{delete_images, ImageStore},
};
use crate::{
    error::{AppError, AppResult},
    models::{
        publication::{CreatePublication, PublicationAssignment, UpdatePublication},
        upload::ImageDeleteReport,
        Category, Publication, PublicationShort,
    },
    repository::Repository,
};

const SEARCH_LIMIT: i64 = 20;

#[derive(Clone)]
pub struct PublicationService {
    repository: Repository,
    storage: Arc<dyn ImageStore>,
    export: ExportService,
}

fn non_empty(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

impl PublicationService {
    pub fn new(repository: Repository, storage: Arc<dyn ImageStore>, export: ExportService) -> Self {
        Self {
            repository,
            storage,
            export,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Publication>> {
        self.repository.publications_list(None).await
    }

    /// Publications of one category; unknown categories have none.
    pub async fn list_by_category(&self, category: &str) -> AppResult<Vec<Publication>> {
        match category.parse::<Category>() {
            Ok(category) => self.repository.publications_list(Some(category)).await,
            Err(_) => {
                tracing::debug!("Unknown category requested: {}", category);
                Ok(Vec::new())
            }
        }
    }

    /// Members of a displayed carousel; General and unknown labels have none.
    pub async fn list_carousel(&self, category: &str) -> AppResult<Vec<Publication>> {
        match category.parse::<Category>() {
            Ok(category) if category.is_displayed() => {
                self.repository.publications_list(Some(category)).await
            }
            _ => {
                tracing::debug!("No carousel for category {}", category);
                Ok(Vec::new())
            }
        }
    }

    pub async fn get(&self, id: i64) -> AppResult<Publication> {
        self.repository.publications_get_by_id(id).await
    }

    pub async fn search(&self, query: &str) -> AppResult<Vec<PublicationShort>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::BadRequest("Search query is required".to_string()));
        }
        self.repository.publications_search(query, SEARCH_LIMIT).await
    }

    pub async fn create(&self, data: CreatePublication) -> AppResult<Publication> {
        data.validate()?;
        let category = match data.category.as_deref() {
            Some(c) if !c.trim().is_empty() => c.parse()?,
            _ => Category::General,
        };

        let data = CreatePublication {
            image_paths: non_empty(&data.image_paths),
            key_points: non_empty(&data.key_points),
            ..data
        };
        let publication = self.repository.publications_create(&data, category).await?;
        tracing::info!("Created publication {} in {}", publication.id, category);

        self.export.refresh().await;
        Ok(publication)
    }

    /// Assign category, images and summary to an existing publication.
    pub async fn update(&self, data: UpdatePublication) -> AppResult<Publication> {
        data.validate()?;
        let category: Category = data.category.parse()?;
        let id = self.resolve_id(&data).await?;

        let assignment = PublicationAssignment {
            category,
            images: data.image_paths.as_deref().map(non_empty),
            abstract_text: data.abstract_text.map(|a| a.trim().to_string()),
            key_points: data.key_points.as_deref().map(non_empty),
        };

        let publication = self.repository.publications_assign(id, &assignment).await?;
        tracing::info!("Publication {} assigned to {}", id, category);

        self.export.refresh().await;
        Ok(publication)
    }

    async fn resolve_id(&self, data: &UpdatePublication) -> AppResult<i64> {
        if let Some(id) = data.id {
            return Ok(id);
        }

        let title = data.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation(
                "Publication id or title is required".to_string(),
            ));
        }

        let id = self
            .repository
            .publications_find_id_by_title(title)
            .await?
            .ok_or_else(|| AppError::NotFound("Publication not found".to_string()))?;
        tracing::debug!("Resolved title {:?} to publication {}", title, id);
        Ok(id)
    }

    /// Remove a publication from its carousel without deleting it.
    pub async fn remove_from_category(&self, id: i64) -> AppResult<Publication> {
        let publication = self.repository.publications_reset_category(id).await?;
        tracing::info!("Publication {} moved to General", id);

        self.export.refresh().await;
        Ok(publication)
    }

    /// Delete a publication and, best effort, its stored images.
    pub async fn delete(&self, id: i64) -> AppResult<(Publication, ImageDeleteReport)> {
        let publication = self.repository.publications_get_by_id(id).await?;
        let report = delete_images(self.storage.as_ref(), &publication.images).await;
        self.repository.publications_delete(id).await?;

        tracing::info!(
            "Deleted publication {} ({} images removed, {} failures)",
            id,
            report.deleted.len(),
            report.errors.len()
        );

        self.export.refresh().await;
        Ok((publication, report))
    }
}
