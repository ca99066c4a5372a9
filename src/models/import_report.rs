//! Import report models for DOI deduplication during bibliographic import.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Accept `true`, `1`, `"1"` or `"true"` as set flags.
fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes"),
        _ => false,
    })
}

/// Text fields the API sometimes sends as numbers.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Publication as delivered by the facility publication API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RemotePublication {
    pub title: Option<String>,
    pub authors: Option<String>,
    pub journal: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub volume: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub issue: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub page_from: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub page_to: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub year: Option<String>,
    pub online_pub_date: Option<String>,
    #[serde(rename = "DOI")]
    pub doi: Option<String>,
    pub beamlines: Option<String>,
    #[serde(deserialize_with = "truthy")]
    pub verified: bool,
    #[serde(deserialize_with = "truthy")]
    pub high_impact: bool,
}

impl RemotePublication {
    pub fn trimmed_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn trimmed_doi(&self) -> &str {
        self.doi.as_deref().map(str::trim).unwrap_or_default()
    }
}

/// Beamline entry from the facility beamline list.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteBeamline {
    pub pk: i64,
    pub beamline: String,
    #[serde(rename = "Order", default)]
    pub order: i64,
}

/// What happened to one remote publication.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImportAction {
    Created,
    SkippedDuplicateDoi,
    SkippedMissingTitle,
}

/// Summary returned after an import run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ImportReport {
    pub beamline: String,
    pub new_beamlines: u64,
    pub created: u64,
    pub skipped_duplicates: u64,
    pub skipped_untitled: u64,
    pub total_publications: i64,
    pub high_impact_publications: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ImportReport {
    pub fn record(&mut self, action: ImportAction) {
        match action {
            ImportAction::Created => self.created += 1,
            ImportAction::SkippedDuplicateDoi => self.skipped_duplicates += 1,
            ImportAction::SkippedMissingTitle => self.skipped_untitled += 1,
        }
    }
}
