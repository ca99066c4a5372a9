//! Publication domain methods on Repository

use std::collections::HashSet;

use chrono::NaiveDateTime;
use sqlx::FromRow;

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{
        import_report::RemotePublication,
        publication::{
            bare_doi, decode_string_list, encode_string_list, CreatePublication, Publication,
            PublicationAssignment, PublicationRow, PublicationShort,
        },
        Category, Summary,
    },
};

/// Columns selected for a full publication; curated summary fields fall
/// back to the cached generated ones.
const PUBLICATION_COLUMNS: &str = r#"
    id, title, authors, journal, volume, issue, page_from, page_to, year,
    online_pub_date, doi, beamlines, verified, high_impact, category, tags, images,
    COALESCE(abstract, ai_abstract) AS abstract_text,
    COALESCE(key_points, ai_key_points) AS key_points,
    created_at
"#;

/// Cached generated summary for a DOI
#[derive(Debug, Clone, FromRow)]
pub struct CachedSummaryRow {
    pub id: i64,
    pub doi: String,
    pub ai_abstract: Option<String>,
    pub ai_key_points: Option<String>,
    pub last_summary_update: Option<NaiveDateTime>,
}

impl CachedSummaryRow {
    /// Usable summary when both parts are present.
    pub fn summary(&self) -> Option<Summary> {
        let abstract_text = self.ai_abstract.clone()?;
        self.ai_key_points.as_ref()?;
        Some(Summary {
            abstract_text,
            key_points: decode_string_list(self.ai_key_points.as_deref(), "ai_key_points"),
        })
    }
}

/// Publication needing a (re)generated summary
#[derive(Debug, Clone, FromRow)]
pub struct SummaryCandidate {
    pub id: i64,
    pub doi: String,
    pub title: String,
    pub authors: Option<String>,
}

#[derive(Debug, Clone, Copy, FromRow)]
pub struct PublicationCounts {
    pub total: i64,
    pub high_impact: i64,
}

impl Repository {
    /// List publications, newest first, optionally restricted to a category.
    ///
    /// Rows without a category belong to `General`.
    pub async fn publications_list(&self, category: Option<Category>) -> AppResult<Vec<Publication>> {
        let rows = match category {
            Some(category) => {
                let query = format!(
                    "SELECT {} FROM publications \
                     WHERE LOWER(TRIM(COALESCE(category, 'General'))) = LOWER(?) \
                     ORDER BY year DESC, title ASC",
                    PUBLICATION_COLUMNS
                );
                sqlx::query_as::<_, PublicationRow>(&query)
                    .bind(category.label())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!(
                    "SELECT {} FROM publications ORDER BY year DESC, title ASC",
                    PUBLICATION_COLUMNS
                );
                sqlx::query_as::<_, PublicationRow>(&query)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(Publication::from).collect())
    }

    /// All publications in id order, for the JSON snapshot
    pub async fn publications_export(&self) -> AppResult<Vec<Publication>> {
        let query = format!("SELECT {} FROM publications ORDER BY id", PUBLICATION_COLUMNS);
        let rows = sqlx::query_as::<_, PublicationRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Publication::from).collect())
    }

    /// Get publication by ID
    pub async fn publications_get_by_id(&self, id: i64) -> AppResult<Publication> {
        let query = format!("SELECT {} FROM publications WHERE id = ?", PUBLICATION_COLUMNS);
        sqlx::query_as::<_, PublicationRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Publication::from)
            .ok_or_else(|| AppError::NotFound(format!("Publication {} not found", id)))
    }

    /// First publication whose title contains `title`, case-insensitive
    pub async fn publications_find_id_by_title(&self, title: &str) -> AppResult<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM publications
            WHERE LOWER(title) LIKE LOWER(?) OR LOWER(title) = LOWER(?)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(format!("%{}%", title))
        .bind(title)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    /// Substring search over title, authors and DOI
    pub async fn publications_search(&self, term: &str, limit: i64) -> AppResult<Vec<PublicationShort>> {
        let pattern = format!("%{}%", term);
        let rows = sqlx::query_as::<_, PublicationShort>(
            r#"
            SELECT id, title, authors, journal, year, doi, category
            FROM publications
            WHERE LOWER(title) LIKE LOWER(?)
               OR LOWER(authors) LIKE LOWER(?)
               OR LOWER(doi) LIKE LOWER(?)
            ORDER BY year DESC, title ASC
            LIMIT ?
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Create a publication from the admin form
    pub async fn publications_create(&self, data: &CreatePublication, category: Category) -> AppResult<Publication> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO publications
                (title, authors, journal, year, online_pub_date, doi, high_impact,
                 category, images, abstract, key_points)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(data.title.trim())
        .bind(data.authors.trim())
        .bind(&data.journal)
        .bind(&data.year)
        .bind(&data.online_pub_date)
        .bind(data.doi.as_deref().map(str::trim))
        .bind(data.high_impact)
        .bind(category.label())
        .bind(encode_string_list(&data.image_paths))
        .bind(&data.abstract_text)
        .bind(encode_string_list(&data.key_points))
        .fetch_one(&self.pool)
        .await?;

        self.publications_get_by_id(id).await
    }

    /// Insert a publication pulled from the bibliographic API
    pub async fn publications_insert_remote(&self, remote: &RemotePublication) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO publications
                (title, authors, journal, volume, issue, page_from, page_to,
                 year, online_pub_date, doi, beamlines, verified, high_impact)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(remote.trimmed_title().unwrap_or_default())
        .bind(remote.authors.as_deref().unwrap_or_default())
        .bind(remote.journal.as_deref().unwrap_or_default())
        .bind(remote.volume.as_deref().unwrap_or_default())
        .bind(remote.issue.as_deref().unwrap_or_default())
        .bind(remote.page_from.as_deref().unwrap_or_default())
        .bind(remote.page_to.as_deref().unwrap_or_default())
        .bind(remote.year.as_deref().unwrap_or_default())
        .bind(remote.online_pub_date.as_deref().unwrap_or_default())
        .bind(remote.trimmed_doi())
        .bind(remote.beamlines.as_deref().unwrap_or_default())
        .bind(remote.verified)
        .bind(remote.high_impact)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    /// Overwrite category and, when given, images and summary fields
    pub async fn publications_assign(&self, id: i64, data: &PublicationAssignment) -> AppResult<Publication> {
        let mut sets = vec!["category = ?"];
        if data.images.is_some() {
            sets.push("images = ?");
        }
        if data.abstract_text.is_some() {
            sets.push("abstract = ?");
        }
        if data.key_points.is_some() {
            sets.push("key_points = ?");
        }

        let query = format!("UPDATE publications SET {} WHERE id = ?", sets.join(", "));
        let mut builder = sqlx::query(&query).bind(data.category.label());

        if let Some(ref images) = data.images {
            builder = builder.bind(encode_string_list(images));
        }
        if let Some(ref abstract_text) = data.abstract_text {
            builder = builder.bind(abstract_text.clone());
        }
        if let Some(ref key_points) = data.key_points {
            builder = builder.bind(encode_string_list(key_points));
        }

        let result = builder.bind(id).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Publication {} not found", id)));
        }
        self.publications_get_by_id(id).await
    }

    /// Take a publication out of every carousel and drop its images
    pub async fn publications_reset_category(&self, id: i64) -> AppResult<Publication> {
        let result = sqlx::query("UPDATE publications SET category = ?, images = '[]' WHERE id = ?")
            .bind(Category::General.label())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Publication {} not found", id)));
        }
        self.publications_get_by_id(id).await
    }

    /// Delete publication, returning the removed row
    pub async fn publications_delete(&self, id: i64) -> AppResult<Publication> {
        let publication = self.publications_get_by_id(id).await?;
        sqlx::query("DELETE FROM publications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(publication)
    }

    /// Lowercased DOIs already stored
    pub async fn publications_existing_dois(&self) -> AppResult<HashSet<String>> {
        let dois: Vec<String> = sqlx::query_scalar(
            "SELECT doi FROM publications WHERE doi IS NOT NULL AND doi != ''",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(dois.into_iter().map(|doi| doi.trim().to_lowercase()).collect())
    }

    pub async fn publications_counts(&self) -> AppResult<PublicationCounts> {
        let counts = sqlx::query_as::<_, PublicationCounts>(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(CASE WHEN high_impact THEN 1 ELSE 0 END), 0) AS high_impact
            FROM publications
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    /// Cached generated summary of the first publication with this DOI.
    ///
    /// Stored DOIs may carry any resolver prefix; they match when their
    /// bare form equals `doi`, ignoring case.
    pub async fn publications_cached_summary(&self, doi: &str) -> AppResult<Option<CachedSummaryRow>> {
        let doi = bare_doi(doi);
        let rows = sqlx::query_as::<_, CachedSummaryRow>(
            r#"
            SELECT id, doi, ai_abstract, ai_key_points, last_summary_update
            FROM publications
            WHERE doi IS NOT NULL AND LOWER(TRIM(doi)) LIKE '%' || LOWER(?)
            ORDER BY id
            "#,
        )
        .bind(doi)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .find(|row| bare_doi(&row.doi).eq_ignore_ascii_case(doi)))
    }

    pub async fn publications_store_summary(&self, id: i64, summary: &Summary, at: NaiveDateTime) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE publications
            SET ai_abstract = ?, ai_key_points = ?, last_summary_update = ?
            WHERE id = ?
            "#,
        )
        .bind(&summary.abstract_text)
        .bind(encode_string_list(&summary.key_points))
        .bind(at)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Publications with a DOI whose generated summary is missing or older
    /// than `stale_before`
    pub async fn publications_summary_candidates(&self, stale_before: NaiveDateTime) -> AppResult<Vec<SummaryCandidate>> {
        let rows = sqlx::query_as::<_, SummaryCandidate>(
            r#"
            SELECT id, doi, title, authors
            FROM publications
            WHERE doi IS NOT NULL AND doi != ''
              AND (ai_abstract IS NULL
                   OR ai_key_points IS NULL
                   OR last_summary_update IS NULL
                   OR last_summary_update < ?)
            ORDER BY id
            "#,
        )
        .bind(stale_before)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
