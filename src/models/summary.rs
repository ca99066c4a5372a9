//! Generated publication summaries

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Summary produced by the language model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub key_points: Vec<String>,
}

/// Request a summary for a DOI
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SummarizeRequest {
    #[validate(length(min = 1))]
    pub doi: String,
    pub title: Option<String>,
    pub authors: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeResponse {
    #[serde(flatten)]
    pub summary: Summary,
    /// Served from the database cache rather than generated
    pub cached: bool,
}

/// Outcome of a bulk summary refresh
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct SummaryRefreshReport {
    pub candidates: usize,
    pub updated: usize,
    pub failed: usize,
}
