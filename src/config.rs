//! Configuration management for EasyPublication server

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::{env, path::PathBuf};

use crate::carousel::GestureConfig;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Cloudinary,
    Local,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub api_base: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for the local backend
    pub upload_dir: PathBuf,
    /// URL prefix under which `upload_dir` is served
    pub public_base_url: String,
    pub cloudinary: CloudinaryConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SummaryConfig {
    /// OpenAI compatible chat completions endpoint
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub crossref_url: String,
    /// Age after which a cached summary is regenerated
    pub cache_days: i64,
    pub request_timeout_secs: u64,
    /// Pause between requests during a bulk refresh
    pub refresh_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ImportConfig {
    pub base_url: String,
    pub beamline: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub data_dir: PathBuf,
    pub file_name: String,
}

impl ExportConfig {
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub summary: SummaryConfig,
    pub import: ImportConfig,
    pub export: ExportConfig,
    pub carousel: GestureConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (EASYPUB_SERVER__PORT=...)
            .add_source(
                Environment::with_prefix("EASYPUB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("summary.api_key", env::var("GROQ_API_KEY").ok())?
            .set_override_option(
                "storage.cloudinary.cloud_name",
                env::var("CLOUDINARY_CLOUD_NAME").ok(),
            )?
            .set_override_option(
                "storage.cloudinary.api_key",
                env::var("CLOUDINARY_API_KEY").ok(),
            )?
            .set_override_option(
                "storage.cloudinary.api_secret",
                env::var("CLOUDINARY_API_SECRET").ok(),
            )?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://server/als-publications.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for CloudinaryConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: "easypublication".to_string(),
            api_base: "https://api.cloudinary.com/v1_1".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            upload_dir: PathBuf::from("public/images"),
            public_base_url: "/images".to_string(),
            cloudinary: CloudinaryConfig::default(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            api_key: None,
            model: "llama-3.1-8b-instant".to_string(),
            temperature: 0.4,
            max_tokens: 1024,
            crossref_url: "https://api.crossref.org/works".to_string(),
            cache_days: 30,
            request_timeout_secs: 30,
            refresh_delay_ms: 1000,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            base_url: "https://alsusweb.lbl.gov".to_string(),
            beamline: "8.3.2".to_string(),
            request_timeout_secs: 60,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("public/data"),
            file_name: "all-publications.json".to_string(),
        }
    }
}
