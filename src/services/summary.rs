//! Publication summaries generated by a chat completion model
//!
//! Summaries are cached on the publication row and reused until they are
//! older than `cache_days`. The API key never leaves the server.

use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::export::ExportService;
use crate::{
    config::SummaryConfig,
    error::{AppError, AppResult},
    models::summary::{SummarizeRequest, SummarizeResponse, SummaryRefreshReport},
    models::{publication::bare_doi, Summary},
    repository::Repository,
};

static MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid markup pattern"));

const SYSTEM_PROMPT: &str = "You are a scientific publication assistant specializing in engaging \
research summaries. Create concise abstracts that subtly hook readers by highlighting the \
research's significance or real-world impact, while maintaining academic tone. Keep abstracts \
under 430 characters.";

/// Plain text of a JATS/HTML fragment
pub fn strip_markup(text: &str) -> String {
    MARKUP
        .replace_all(text, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Publication facts the prompt is built from
#[derive(Debug, Clone, Default)]
pub struct PromptInput<'a> {
    pub doi: &'a str,
    pub title: Option<&'a str>,
    pub authors: Option<&'a str>,
    pub source_abstract: Option<&'a str>,
}

pub fn build_user_prompt(input: &PromptInput<'_>) -> String {
    let mut prompt = format!(
        "Write an engaging abstract and key points for this publication:\n\
         DOI: {}\n\
         Title: {}\n\
         Authors: {}\n",
        input.doi,
        input.title.unwrap_or("Unknown"),
        input.authors.unwrap_or("Unknown"),
    );
    if let Some(source) = input.source_abstract {
        prompt.push_str(&format!("Publisher abstract: {}\n", source));
    }
    prompt.push_str(
        "\nReturn ONLY a JSON object with these exact fields:\n\
         {\n  \"abstract\": \"A concise, engaging summary that subtly hooks readers (max 430 chars)\",\n  \
         \"keyPoints\": [\"Point 1\", \"Point 2\", \"Point 3\"]\n}",
    );
    prompt
}

/// Extract the summary object from a model reply.
///
/// Models sometimes wrap the JSON in prose or code fences; everything
/// outside the outermost braces is ignored.
pub fn parse_summary(content: &str) -> AppResult<Summary> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => return Err(AppError::Upstream("No JSON object in model reply".to_string())),
    };

    let summary: Summary = serde_json::from_str(json)
        .map_err(|e| AppError::Upstream(format!("Invalid content format in model reply: {}", e)))?;

    if summary.abstract_text.trim().is_empty() {
        return Err(AppError::Upstream("Model reply has an empty abstract".to_string()));
    }

    Ok(Summary {
        abstract_text: summary.abstract_text.trim().to_string(),
        key_points: summary
            .key_points
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
    })
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct CrossrefResponse {
    message: CrossrefWork,
}

#[derive(Deserialize)]
struct CrossrefWork {
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
}

#[derive(Clone)]
pub struct SummaryService {
    repository: Repository,
    export: ExportService,
    client: reqwest::Client,
    config: SummaryConfig,
}

impl SummaryService {
    pub fn new(repository: Repository, export: ExportService, config: SummaryConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("easypublication/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            repository,
            export,
            client,
            config,
        })
    }

    fn is_fresh(&self, updated: Option<NaiveDateTime>) -> bool {
        let max_age = chrono::Duration::days(self.config.cache_days);
        updated.is_some_and(|at| Utc::now().naive_utc() - at < max_age)
    }

    /// Summary for a DOI, from cache when fresh, otherwise generated and
    /// cached on the matching publication.
    pub async fn summarize(&self, request: SummarizeRequest) -> AppResult<SummarizeResponse> {
        request.validate()?;
        let doi = bare_doi(&request.doi);
        if doi.is_empty() {
            return Err(AppError::Validation("DOI is required".to_string()));
        }

        let cached = self.repository.publications_cached_summary(doi).await?;
        if let Some(row) = cached.as_ref() {
            if let Some(summary) = row.summary().filter(|_| self.is_fresh(row.last_summary_update)) {
                tracing::debug!("Serving cached summary for {}", doi);
                return Ok(SummarizeResponse {
                    summary,
                    cached: true,
                });
            }
        }

        let summary = self
            .generate(doi, request.title.as_deref(), request.authors.as_deref())
            .await?;

        if let Some(row) = cached {
            self.repository
                .publications_store_summary(row.id, &summary, Utc::now().naive_utc())
                .await?;
            self.export.refresh().await;
        }

        Ok(SummarizeResponse {
            summary,
            cached: false,
        })
    }

    /// Regenerate missing or stale summaries for every publication with a DOI.
    pub async fn refresh_stale(&self) -> AppResult<SummaryRefreshReport> {
        let cutoff = Utc::now().naive_utc() - chrono::Duration::days(self.config.cache_days);
        let candidates = self.repository.publications_summary_candidates(cutoff).await?;
        let mut report = SummaryRefreshReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        tracing::info!("Refreshing summaries for {} publications", candidates.len());

        for (position, candidate) in candidates.iter().enumerate() {
            if position > 0 && self.config.refresh_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.refresh_delay_ms)).await;
            }

            let generated = self
                .generate(
                    bare_doi(&candidate.doi),
                    Some(&candidate.title),
                    candidate.authors.as_deref(),
                )
                .await;

            match generated {
                Ok(summary) => {
                    self.repository
                        .publications_store_summary(candidate.id, &summary, Utc::now().naive_utc())
                        .await?;
                    report.updated += 1;
                }
                Err(e) => {
                    tracing::error!("Summary for publication {} failed: {}", candidate.id, e);
                    report.failed += 1;
                }
            }
        }

        if report.updated > 0 {
            self.export.refresh().await;
        }
        Ok(report)
    }

    async fn generate(&self, doi: &str, title: Option<&str>, authors: Option<&str>) -> AppResult<Summary> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::Internal("Summary API key not configured".to_string()))?;

        let source_abstract = self.fetch_crossref_abstract(doi).await;
        let prompt = build_user_prompt(&PromptInput {
            doi,
            title,
            authors,
            source_abstract: source_abstract.as_deref(),
        });

        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Summary API error ({}): {}", status, body)));
        }

        let reply: ChatResponse = response.json().await?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::Upstream("No content in summary response".to_string()))?;

        tracing::info!("Generated summary for {}", doi);
        parse_summary(&content)
    }

    /// Publisher abstract from CrossRef; any failure yields `None`.
    async fn fetch_crossref_abstract(&self, doi: &str) -> Option<String> {
        let mut url = reqwest::Url::parse(&self.config.crossref_url).ok()?;
        url.path_segments_mut().ok()?.push(doi);

        let response = match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!("CrossRef returned {} for {}", response.status(), doi);
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to fetch from CrossRef: {}", e);
                return None;
            }
        };

        let work: CrossrefResponse = response.json().await.ok()?;
        work.message
            .abstract_text
            .map(|a| strip_markup(&a))
            .filter(|a| !a.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_markup() {
        assert_eq!(
            strip_markup("<jats:p>Water <jats:italic>splits</jats:italic>\n fast.</jats:p>"),
            "Water splits fast."
        );
    }

    #[test]
    fn test_parse_plain_json() {
        let summary =
            parse_summary(r#"{"abstract": " Short. ", "keyPoints": ["a", " ", "b "]}"#).unwrap();
        assert_eq!(summary.abstract_text, "Short.");
        assert_eq!(summary.key_points, vec!["a", "b"]);
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "Here you go:\n```json\n{\"abstract\": \"X\", \"keyPoints\": []}\n```";
        assert_eq!(parse_summary(reply).unwrap().abstract_text, "X");
    }

    #[test]
    fn test_parse_rejects_bad_replies() {
        assert!(parse_summary("no json here").is_err());
        assert!(parse_summary(r#"{"abstract": "", "keyPoints": []}"#).is_err());
        assert!(parse_summary(r#"{"summary": "wrong shape"}"#).is_err());
    }

    #[test]
    fn test_prompt_mentions_inputs() {
        let prompt = build_user_prompt(&PromptInput {
            doi: "10.1/a",
            title: Some("Title"),
            authors: None,
            source_abstract: Some("Publisher text"),
        });
        assert!(prompt.contains("DOI: 10.1/a"));
        assert!(prompt.contains("Title: Title"));
        assert!(prompt.contains("Authors: Unknown"));
        assert!(prompt.contains("Publisher abstract: Publisher text"));
        assert!(prompt.contains("\"keyPoints\""));
    }
}
