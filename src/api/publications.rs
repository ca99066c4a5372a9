//! Publication endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::{
        publication::{CreatePublication, PublicationIdRequest, UpdatePublication},
        upload::ImageDeleteError,
        Publication, PublicationShort,
    },
    AppState,
};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Substring of title, authors or DOI
    #[serde(default)]
    pub query: String,
}

#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    pub publications: Vec<PublicationShort>,
}

#[derive(Serialize, ToSchema)]
pub struct PublicationChangeResponse {
    pub success: bool,
    pub publication: Publication,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletePublicationResponse {
    pub success: bool,
    pub publication_id: i64,
    pub deleted_images: usize,
    pub image_errors: Vec<ImageDeleteError>,
}

/// List all publications
#[utoipa::path(
    get,
    path = "/publications",
    tag = "publications",
    responses(
        (status = 200, description = "All publications, newest first", body = Vec<Publication>)
    )
)]
pub async fn list_publications(State(state): State<AppState>) -> AppResult<Json<Vec<Publication>>> {
    let publications = state.services.publications.list().await?;
    Ok(Json(publications))
}

/// List the publications of one category
#[utoipa::path(
    get,
    path = "/publications/{category}",
    tag = "publications",
    params(("category" = String, Path, description = "Category label, case-insensitive")),
    responses(
        (status = 200, description = "Publications in the category", body = Vec<Publication>)
    )
)]
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<Publication>>> {
    let publications = state.services.publications.list_by_category(&category).await?;
    Ok(Json(publications))
}

/// Get publication by ID
#[utoipa::path(
    get,
    path = "/publications/id/{id}",
    tag = "publications",
    params(("id" = i64, Path, description = "Publication ID")),
    responses(
        (status = 200, description = "Publication details", body = Publication),
        (status = 404, description = "Publication not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_publication(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Publication>> {
    let publication = state.services.publications.get(id).await?;
    Ok(Json(publication))
}

/// Create a publication
#[utoipa::path(
    post,
    path = "/publications",
    tag = "publications",
    request_body = CreatePublication,
    responses(
        (status = 201, description = "Publication created", body = Publication),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_publication(
    State(state): State<AppState>,
    Json(data): Json<CreatePublication>,
) -> AppResult<(StatusCode, Json<Publication>)> {
    let publication = state.services.publications.create(data).await?;
    Ok((StatusCode::CREATED, Json(publication)))
}

/// Search publications by title, authors or DOI
#[utoipa::path(
    get,
    path = "/search-publications",
    tag = "publications",
    params(SearchQuery),
    responses(
        (status = 200, description = "At most 20 matches", body = SearchResponse),
        (status = 400, description = "Missing query", body = crate::error::ErrorResponse)
    )
)]
pub async fn search_publications(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let publications = state.services.publications.search(&query.query).await?;
    Ok(Json(SearchResponse { publications }))
}

/// Assign category, images, abstract and key points to a publication
#[utoipa::path(
    post,
    path = "/update-publication",
    tag = "publications",
    request_body = UpdatePublication,
    responses(
        (status = 200, description = "Publication updated", body = PublicationChangeResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 404, description = "Publication not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_publication(
    State(state): State<AppState>,
    Json(data): Json<UpdatePublication>,
) -> AppResult<Json<PublicationChangeResponse>> {
    let publication = state.services.publications.update(data).await?;
    Ok(Json(PublicationChangeResponse {
        success: true,
        publication,
    }))
}

/// Take a publication out of its carousel
#[utoipa::path(
    post,
    path = "/remove-from-category",
    tag = "publications",
    request_body = PublicationIdRequest,
    responses(
        (status = 200, description = "Publication moved to General", body = PublicationChangeResponse),
        (status = 404, description = "Publication not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn remove_from_category(
    State(state): State<AppState>,
    Json(request): Json<PublicationIdRequest>,
) -> AppResult<Json<PublicationChangeResponse>> {
    let publication = state
        .services
        .publications
        .remove_from_category(request.publication_id)
        .await?;
    Ok(Json(PublicationChangeResponse {
        success: true,
        publication,
    }))
}

/// Delete a publication and its images
#[utoipa::path(
    post,
    path = "/delete-publication",
    tag = "publications",
    request_body = PublicationIdRequest,
    responses(
        (status = 200, description = "Publication deleted", body = DeletePublicationResponse),
        (status = 404, description = "Publication not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_publication(
    State(state): State<AppState>,
    Json(request): Json<PublicationIdRequest>,
) -> AppResult<Json<DeletePublicationResponse>> {
    let (publication, report) = state
        .services
        .publications
        .delete(request.publication_id)
        .await?;
    Ok(Json(DeletePublicationResponse {
        success: true,
        publication_id: publication.id,
        deleted_images: report.deleted.len(),
        image_errors: report.errors,
    }))
}
