//! Import of publications from the facility publication API
//!
//! Only publications whose DOI is not yet known are added; existing rows
//! are never modified.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;

use super::export::ExportService;
use crate::{
    config::ImportConfig,
    error::{AppError, AppResult},
    models::import_report::{ImportAction, ImportReport, RemoteBeamline, RemotePublication},
    repository::Repository,
};

#[async_trait]
pub trait BibliographicSource: Send + Sync {
    async fn beamlines(&self) -> AppResult<Vec<RemoteBeamline>>;

    async fn publications(&self, beamline: &str) -> AppResult<Vec<RemotePublication>>;
}

#[derive(Deserialize)]
struct BeamlineList {
    #[serde(rename = "PubBeamlines", default)]
    beamlines: Vec<RemoteBeamline>,
}

/// The publication list endpoint returns a bare object for a single hit.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> From<OneOrMany<T>> for Vec<T> {
    fn from(value: OneOrMany<T>) -> Self {
        match value {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Deserialize)]
struct PublicationList {
    #[serde(rename = "Publications")]
    publications: Option<OneOrMany<RemotePublication>>,
}

/// HTTP client for the facility publication API
pub struct HttpBibliographicSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBibliographicSource {
    pub fn new(config: &ImportConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl BibliographicSource for HttpBibliographicSource {
    async fn beamlines(&self) -> AppResult<Vec<RemoteBeamline>> {
        let url = format!("{}/GetALSPubBeamlineList", self.base_url);
        let list: BeamlineList = self.get_json(&url).await?;
        Ok(list.beamlines)
    }

    async fn publications(&self, beamline: &str) -> AppResult<Vec<RemotePublication>> {
        let mut url = reqwest::Url::parse(&format!("{}/GetALSPubs/", self.base_url))
            .map_err(|e| AppError::Internal(format!("Invalid import base URL: {}", e)))?;
        url.query_pairs_mut().append_pair("bl", beamline);

        let list: PublicationList = self.get_json(url.as_str()).await?;
        Ok(list.publications.map(Vec::from).unwrap_or_default())
    }
}

#[derive(Clone)]
pub struct ImportService {
    repository: Repository,
    source: Arc<dyn BibliographicSource>,
    export: ExportService,
    beamline: String,
}

impl ImportService {
    pub fn new(
        repository: Repository,
        source: Arc<dyn BibliographicSource>,
        export: ExportService,
        beamline: String,
    ) -> Self {
        Self {
            repository,
            source,
            export,
            beamline,
        }
    }

    /// Pull beamlines and the configured beamline's publications.
    pub async fn run(&self) -> AppResult<ImportReport> {
        tracing::info!("Starting publication import for beamline {}", self.beamline);
        let mut report = ImportReport {
            beamline: self.beamline.clone(),
            ..Default::default()
        };

        match self.source.beamlines().await {
            Ok(mut beamlines) => {
                beamlines.sort_by_key(|b| b.order);
                let known = self.repository.beamlines_existing_pks().await?;
                for beamline in beamlines.iter().filter(|b| !known.contains(&b.pk)) {
                    if self.repository.beamlines_insert(beamline).await? {
                        report.new_beamlines += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Beamline list unavailable: {}", e);
                report.warnings.push(format!("Beamline list unavailable: {}", e));
            }
        }

        let remote = self.source.publications(&self.beamline).await?;
        let mut seen = self.repository.publications_existing_dois().await?;
        tracing::info!(
            "Fetched {} publications, {} DOIs already stored",
            remote.len(),
            seen.len()
        );

        for publication in &remote {
            let action = if publication.trimmed_title().is_none() {
                ImportAction::SkippedMissingTitle
            } else {
                let doi = publication.trimmed_doi().to_lowercase();
                if !doi.is_empty() && !seen.insert(doi) {
                    ImportAction::SkippedDuplicateDoi
                } else {
                    self.repository.publications_insert_remote(publication).await?;
                    ImportAction::Created
                }
            };
            report.record(action);
        }

        let counts = self.repository.publications_counts().await?;
        report.total_publications = counts.total;
        report.high_impact_publications = counts.high_impact;

        tracing::info!(
            "Import finished: {} created, {} duplicates, {} untitled",
            report.created,
            report.skipped_duplicates,
            report.skipped_untitled
        );

        if report.created > 0 {
            self.export.refresh().await;
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publication_list_accepts_single_object() {
        let list: PublicationList = serde_json::from_str(
            r#"{"Publications": {"Title": "Only one", "DOI": "10.1/x", "HighImpact": true}}"#,
        )
        .unwrap();
        let publications: Vec<_> = list.publications.map(Vec::from).unwrap_or_default();
        assert_eq!(publications.len(), 1);
        assert_eq!(publications[0].trimmed_doi(), "10.1/x");
        assert!(publications[0].high_impact);
    }

    #[test]
    fn test_publication_list_accepts_array() {
        let list: PublicationList = serde_json::from_str(
            r#"{"Publications": [{"Title": "A"}, {"Title": "  ", "DOI": " 10.1/b "}]}"#,
        )
        .unwrap();
        let publications: Vec<_> = list.publications.map(Vec::from).unwrap_or_default();
        assert_eq!(publications.len(), 2);
        assert_eq!(publications[1].trimmed_title(), None);
        assert_eq!(publications[1].trimmed_doi(), "10.1/b");
    }

    #[test]
    fn test_beamline_list() {
        let list: BeamlineList = serde_json::from_str(
            r#"{"PubBeamlines": [{"pk": 7, "beamline": "8.3.2", "Order": 3}]}"#,
        )
        .unwrap();
        assert_eq!(list.beamlines[0].pk, 7);
        assert_eq!(list.beamlines[0].order, 3);
    }
}
