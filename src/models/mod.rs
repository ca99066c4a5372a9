//! Data models for EasyPublication

pub mod category;
pub mod import_report;
pub mod publication;
pub mod summary;
pub mod upload;

// Re-export commonly used types
pub use category::Category;
pub use publication::{Publication, PublicationShort};
pub use summary::Summary;
