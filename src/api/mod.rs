//! API handlers for EasyPublication REST endpoints

pub mod admin;
pub mod carousel;
pub mod health;
pub mod openapi;
pub mod publications;
pub mod summaries;
pub mod uploads;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{config::StorageBackend, AppState};

/// Upper bound on a multipart upload request
const UPLOAD_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Publications
        .route(
            "/publications",
            get(publications::list_publications).post(publications::create_publication),
        )
        .route("/publications/:category", get(publications::list_by_category))
        .route("/publications/id/:id", get(publications::get_publication))
        .route("/search-publications", get(publications::search_publications))
        .route("/update-publication", post(publications::update_publication))
        .route("/remove-from-category", post(publications::remove_from_category))
        .route("/delete-publication", post(publications::delete_publication))
        // Carousel
        .route("/carousel/:category", get(carousel::get_carousel))
        // Uploads
        .route(
            "/upload",
            post(uploads::upload_files).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Summaries
        .route("/summarize", post(summaries::summarize))
        .route("/refresh-summaries", post(summaries::refresh_summaries))
        // Maintenance
        .route("/import", post(admin::import_publications))
        .route("/export-database", post(admin::export_database))
        .with_state(state.clone());

    let mut app = Router::new()
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .nest_service("/data", ServeDir::new(&state.config.export.data_dir));

    if state.config.storage.backend == StorageBackend::Local {
        let mount = state.config.storage.public_base_url.trim_end_matches('/');
        if mount.starts_with('/') && mount.len() > 1 {
            app = app.nest_service(mount, ServeDir::new(&state.config.storage.upload_dir));
        }
    }

    app.layer(TraceLayer::new_for_http()).layer(cors)
}
