//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{admin, carousel, health, publications, summaries, uploads};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EasyPublication API",
        version = "0.1.0",
        description = "Publication carousel backend REST API",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Publications
        publications::list_publications,
        publications::list_by_category,
        publications::get_publication,
        publications::create_publication,
        publications::search_publications,
        publications::update_publication,
        publications::remove_from_category,
        publications::delete_publication,
        // Carousel
        carousel::get_carousel,
        // Uploads
        uploads::upload_files,
        // Summaries
        summaries::summarize,
        summaries::refresh_summaries,
        // Admin
        admin::import_publications,
        admin::export_database,
    ),
    components(
        schemas(
            // Publications
            crate::models::publication::Publication,
            crate::models::publication::PublicationShort,
            crate::models::publication::CreatePublication,
            crate::models::publication::UpdatePublication,
            crate::models::publication::PublicationIdRequest,
            publications::SearchQuery,
            publications::SearchResponse,
            publications::PublicationChangeResponse,
            publications::DeletePublicationResponse,
            // Carousel
            carousel::CarouselView,
            crate::carousel::CardLayout,
            crate::carousel::GestureConfig,
            // Uploads
            crate::models::upload::UploadForm,
            crate::models::upload::UploadResponse,
            crate::models::upload::UploadedFile,
            crate::models::upload::ImageDeleteError,
            crate::models::upload::ImageDeleteReport,
            // Summaries
            crate::models::summary::Summary,
            crate::models::summary::SummarizeRequest,
            crate::models::summary::SummarizeResponse,
            crate::models::summary::SummaryRefreshReport,
            // Admin
            crate::models::import_report::ImportReport,
            crate::models::import_report::ImportAction,
            admin::ExportResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "publications", description = "Publication management"),
        (name = "carousel", description = "Carousel state per category"),
        (name = "uploads", description = "Image uploads"),
        (name = "summaries", description = "Generated abstracts and key points"),
        (name = "admin", description = "Import and export")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::PathItemType;

    #[test]
    fn test_upload_documents_multipart_body() {
        let doc = ApiDoc::openapi();
        let upload = doc.paths.paths.get("/upload").expect("upload path documented");
        let body = upload
            .operations
            .get(&PathItemType::Post)
            .and_then(|op| op.request_body.as_ref())
            .expect("upload request body documented");
        assert!(body.content.contains_key("multipart/form-data"));
    }
}
