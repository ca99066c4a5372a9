//! Summary endpoints

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::summary::{SummarizeRequest, SummarizeResponse, SummaryRefreshReport},
    AppState,
};

/// Summarize a publication by DOI
#[utoipa::path(
    post,
    path = "/summarize",
    tag = "summaries",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Abstract and key points", body = SummarizeResponse),
        (status = 400, description = "Missing DOI", body = crate::error::ErrorResponse),
        (status = 502, description = "Language model unavailable", body = crate::error::ErrorResponse)
    )
)]
pub async fn summarize(
    State(state): State<AppState>,
    Json(request): Json<SummarizeRequest>,
) -> AppResult<Json<SummarizeResponse>> {
    let response = state.services.summary.summarize(request).await?;
    Ok(Json(response))
}

/// Regenerate missing or stale summaries
#[utoipa::path(
    post,
    path = "/refresh-summaries",
    tag = "summaries",
    responses(
        (status = 200, description = "Refresh report", body = SummaryRefreshReport)
    )
)]
pub async fn refresh_summaries(State(state): State<AppState>) -> AppResult<Json<SummaryRefreshReport>> {
    let report = state.services.summary.refresh_stale().await?;
    Ok(Json(report))
}
