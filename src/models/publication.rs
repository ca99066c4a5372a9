//! Publication model

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::category::Category;

const DOI_RESOLVER: &str = "https://doi.org/";

static DOI_URL_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^https?://(dx\.)?doi\.org/").expect("valid DOI prefix pattern"));

/// Publication as served to the front end and written to the JSON snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Publication {
    pub id: i64,
    pub title: String,
    /// Comma separated author list
    pub authors: String,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub page_from: Option<String>,
    pub page_to: Option<String>,
    pub year: Option<String>,
    pub online_pub_date: Option<String>,
    /// Bare DOI or resolver URL
    pub doi: Option<String>,
    pub beamlines: Option<String>,
    pub verified: bool,
    pub high_impact: bool,
    /// One of the four carousel categories or "General"
    pub category: String,
    /// Legacy free-form tags, superseded by category
    pub tags: Option<String>,
    /// Image URLs; the first one is the card thumbnail
    pub images: Vec<String>,
    /// Curated abstract, or the cached generated one
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub key_points: Vec<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl Publication {
    /// Text before the first comma of the author list.
    pub fn first_author(&self) -> &str {
        self.authors.split(',').next().unwrap_or_default().trim()
    }

    /// Resolvable link for the DOI, if any.
    pub fn doi_link(&self) -> Option<String> {
        self.doi.as_deref().and_then(doi_link)
    }

    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// DOI without any resolver URL prefix
pub fn bare_doi(doi: &str) -> &str {
    let doi = doi.trim();
    match DOI_URL_PREFIX.find(doi) {
        Some(m) => &doi[m.end()..],
        None => doi,
    }
}

/// Normalize a DOI to a URL, leaving URLs untouched.
pub fn doi_link(doi: &str) -> Option<String> {
    let doi = doi.trim();
    if doi.is_empty() {
        None
    } else if doi.starts_with("http") {
        Some(doi.to_string())
    } else {
        Some(format!("{}{}", DOI_RESOLVER, doi))
    }
}

/// Decode a JSON encoded string list column. Missing or malformed values
/// yield an empty list.
pub fn decode_string_list(raw: Option<&str>, column: &str) -> Vec<String> {
    match raw.map(str::trim) {
        None | Some("") => Vec::new(),
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
            tracing::warn!("Malformed {} value {:?}: {}", column, raw, e);
            Vec::new()
        }),
    }
}

pub fn encode_string_list(values: &[String]) -> String {
    serde_json::to_string(values).unwrap_or_else(|_| "[]".to_string())
}

/// Raw publications row, list columns still JSON encoded
#[derive(Debug, Clone, FromRow)]
pub struct PublicationRow {
    pub id: i64,
    pub title: String,
    pub authors: Option<String>,
    pub journal: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub page_from: Option<String>,
    pub page_to: Option<String>,
    pub year: Option<String>,
    pub online_pub_date: Option<String>,
    pub doi: Option<String>,
    pub beamlines: Option<String>,
    pub verified: bool,
    pub high_impact: bool,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub images: Option<String>,
    pub abstract_text: Option<String>,
    pub key_points: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<PublicationRow> for Publication {
    fn from(row: PublicationRow) -> Self {
        Self {
            images: decode_string_list(row.images.as_deref(), "images"),
            key_points: decode_string_list(row.key_points.as_deref(), "key_points"),
            category: Category::from_stored(row.category.as_deref()).to_string(),
            id: row.id,
            title: row.title,
            authors: row.authors.unwrap_or_default(),
            journal: row.journal,
            volume: row.volume,
            issue: row.issue,
            page_from: row.page_from,
            page_to: row.page_to,
            year: row.year,
            online_pub_date: row.online_pub_date,
            doi: row.doi,
            beamlines: row.beamlines,
            verified: row.verified,
            high_impact: row.high_impact,
            tags: row.tags,
            abstract_text: row.abstract_text,
            created_at: row.created_at,
        }
    }
}

/// Short search hit
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PublicationShort {
    pub id: i64,
    pub title: String,
    pub authors: Option<String>,
    pub journal: Option<String>,
    pub year: Option<String>,
    pub doi: Option<String>,
    pub category: Option<String>,
}

/// Admin creation of a publication
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePublication {
    #[validate(length(min = 1, max = 1000))]
    pub title: String,
    #[serde(default)]
    pub authors: String,
    pub journal: Option<String>,
    pub year: Option<String>,
    pub online_pub_date: Option<String>,
    pub doi: Option<String>,
    #[serde(default)]
    pub high_impact: bool,
    pub category: Option<String>,
    #[serde(default)]
    pub image_paths: Vec<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
}

/// Admin assignment of category, images and summary to an existing record.
///
/// `id` locates the record; without it the first publication whose title
/// contains `title` (case-insensitive) is used.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePublication {
    pub id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: String,
    #[validate(length(min = 1))]
    pub category: String,
    pub image_paths: Option<Vec<String>>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub key_points: Option<Vec<String>>,
}

/// Fields written by an admin assignment
#[derive(Debug, Clone)]
pub struct PublicationAssignment {
    pub category: Category,
    pub images: Option<Vec<String>>,
    pub abstract_text: Option<String>,
    pub key_points: Option<Vec<String>>,
}

/// Request body naming a publication by id
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicationIdRequest {
    pub publication_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Publication {
        Publication {
            id: 1,
            title: "Operando imaging of lithium dendrites".to_string(),
            authors: "  Smith, J., Doe, A.".to_string(),
            journal: None,
            volume: None,
            issue: None,
            page_from: None,
            page_to: None,
            year: Some("2024".to_string()),
            online_pub_date: None,
            doi: Some("10.1000/xyz123".to_string()),
            beamlines: None,
            verified: false,
            high_impact: false,
            category: "bioscience".to_string(),
            tags: None,
            images: vec!["https://img/a.png".to_string(), "https://img/b.png".to_string()],
            abstract_text: None,
            key_points: vec![],
            created_at: None,
        }
    }

    #[test]
    fn test_first_author() {
        let mut publication = sample();
        assert_eq!(publication.first_author(), "Smith");
        publication.authors = "Single Author".to_string();
        assert_eq!(publication.first_author(), "Single Author");
        publication.authors.clear();
        assert_eq!(publication.first_author(), "");
    }

    #[test]
    fn test_bare_doi() {
        assert_eq!(bare_doi("10.1000/xyz"), "10.1000/xyz");
        assert_eq!(bare_doi(" https://doi.org/10.1000/xyz "), "10.1000/xyz");
        assert_eq!(bare_doi("http://dx.doi.org/10.1/a"), "10.1/a");
        assert_eq!(bare_doi("HTTPS://DX.DOI.ORG/10.1/B"), "10.1/B");
    }

    #[test]
    fn test_doi_link() {
        assert_eq!(
            sample().doi_link().as_deref(),
            Some("https://doi.org/10.1000/xyz123")
        );
        assert_eq!(
            doi_link("https://doi.org/10.1/abc").as_deref(),
            Some("https://doi.org/10.1/abc")
        );
        assert_eq!(doi_link("  "), None);
    }

    #[test]
    fn test_primary_image() {
        let mut publication = sample();
        assert_eq!(publication.primary_image(), Some("https://img/a.png"));
        publication.images.clear();
        assert_eq!(publication.primary_image(), None);
    }

    #[test]
    fn test_decode_string_list() {
        assert_eq!(decode_string_list(Some(r#"["a","b"]"#), "images"), vec!["a", "b"]);
        assert!(decode_string_list(Some("not json"), "images").is_empty());
        assert!(decode_string_list(Some(""), "images").is_empty());
        assert!(decode_string_list(None, "key_points").is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value["images"].is_array());
        assert!(value["key_points"].is_array());
        assert!(value.get("abstract").is_some());
        assert!(value.get("abstract_text").is_none());
    }

    #[test]
    fn test_update_request_accepts_camel_case() {
        let request: UpdatePublication = serde_json::from_value(serde_json::json!({
            "title": "Operando",
            "authors": "Smith",
            "category": "bioscience",
            "imagePaths": ["https://img/c.png"],
            "abstract": "Short",
            "keyPoints": ["one"]
        }))
        .unwrap();
        assert_eq!(request.id, None);
        assert_eq!(request.image_paths.unwrap(), vec!["https://img/c.png"]);
        assert_eq!(request.key_points.unwrap(), vec!["one"]);
    }
}
