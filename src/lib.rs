//! EasyPublication
//!
//! Backend for a publication showcase: a SQLite-backed REST JSON API for
//! curating scientific publications into category carousels, plus the
//! carousel navigation engine the carousels are driven by.

use std::sync::Arc;

pub mod api;
pub mod carousel;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub repository: repository::Repository,
}
