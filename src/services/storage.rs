//! Image storage backends
//!
//! Uploaded images go either to Cloudinary or to a local directory served
//! by the API itself. Deletion is always best effort.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use uuid::Uuid;

use crate::{
    config::{CloudinaryConfig, StorageConfig},
    error::{AppError, AppResult},
    models::upload::{ImageDeleteError, ImageDeleteReport},
};

static CLOUDINARY_PUBLIC_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/v\d+/(.+?)\.").expect("valid public id pattern"));

/// A stored image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    /// Backend identifier
    pub id: String,
    /// Publicly fetchable URL
    pub url: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn store(&self, original_name: &str, bytes: Vec<u8>) -> AppResult<StoredImage>;

    /// Remove the image behind `url`, returning its backend identifier.
    async fn delete(&self, url: &str) -> AppResult<String>;
}

/// Delete every URL, collecting failures instead of stopping at the first.
pub async fn delete_images(store: &dyn ImageStore, urls: &[String]) -> ImageDeleteReport {
    let mut report = ImageDeleteReport::default();
    for url in urls {
        match store.delete(url).await {
            Ok(id) => report.deleted.push(id),
            Err(e) => {
                tracing::warn!("Failed to delete image {}: {}", url, e);
                report.errors.push(ImageDeleteError {
                    url: url.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    report
}

/// Cloudinary public id embedded in a delivery URL
pub fn extract_public_id(url: &str) -> Option<&str> {
    CLOUDINARY_PUBLIC_ID
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn unique_suffix() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}_{}", Utc::now().timestamp_millis(), &random[..9])
}

pub struct CloudinaryStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Deserialize)]
struct CloudinaryUpload {
    public_id: String,
    secure_url: String,
}

#[derive(Deserialize)]
struct CloudinaryDestroy {
    result: String,
}

impl CloudinaryStore {
    pub fn new(config: CloudinaryConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Signature over the sorted `key=value` parameters plus the API secret.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha1::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.config.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn endpoint(&self, resource: &str, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.cloud_name,
            resource,
            action
        )
    }
}

#[async_trait]
impl ImageStore for CloudinaryStore {
    async fn store(&self, original_name: &str, bytes: Vec<u8>) -> AppResult<StoredImage> {
        let timestamp = Utc::now().timestamp().to_string();
        let public_id = format!("publication_{}", unique_suffix());
        let signature = self.sign(&[
            ("folder", self.config.folder.as_str()),
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let file = reqwest::multipart::Part::bytes(bytes).file_name(original_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", self.config.folder.clone())
            .text("public_id", public_id)
            .text("signature", signature);

        let response = self
            .client
            .post(self.endpoint("auto", "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("Cloudinary upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Storage(format!(
                "Cloudinary upload failed ({}): {}",
                status, body
            )));
        }

        let uploaded: CloudinaryUpload = response
            .json()
            .await
            .map_err(|e| AppError::Storage(format!("Invalid Cloudinary response: {}", e)))?;

        tracing::info!("Uploaded {} to Cloudinary as {}", original_name, uploaded.public_id);

        Ok(StoredImage {
            id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }

    async fn delete(&self, url: &str) -> AppResult<String> {
        let public_id = extract_public_id(url)
            .ok_or_else(|| AppError::Storage("Invalid URL format".to_string()))?
            .to_string();
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
        ]);

        let params = [
            ("public_id", public_id.as_str()),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
        ];

        let destroyed: CloudinaryDestroy = self
            .client
            .post(self.endpoint("image", "destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?
            .json()
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        if destroyed.result != "ok" {
            return Err(AppError::Storage(destroyed.result));
        }
        Ok(public_id)
    }
}

/// Stores images in a directory served under `public_base_url`
pub struct LocalStore {
    upload_dir: PathBuf,
    public_base_url: String,
}

impl LocalStore {
    pub fn new(upload_dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// File name inside the upload directory for one of our URLs
    fn file_name_for<'a>(&self, url: &'a str) -> Option<&'a str> {
        let name = url
            .strip_prefix(self.public_base_url.as_str())?
            .strip_prefix('/')?;
        let safe = !name.is_empty() && !name.contains('/') && !name.contains("..");
        safe.then_some(name)
    }
}

#[async_trait]
impl ImageStore for LocalStore {
    async fn store(&self, original_name: &str, bytes: Vec<u8>) -> AppResult<StoredImage> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();
        let file_name = format!("files-{}{}", unique_suffix(), extension);

        tokio::fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|e| AppError::Storage(format!("Cannot create upload directory: {}", e)))?;
        tokio::fs::write(self.upload_dir.join(&file_name), bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Cannot write {}: {}", file_name, e)))?;

        tracing::info!("Stored {} as {}", original_name, file_name);

        Ok(StoredImage {
            url: format!("{}/{}", self.public_base_url, file_name),
            id: file_name,
        })
    }

    async fn delete(&self, url: &str) -> AppResult<String> {
        let name = self
            .file_name_for(url)
            .ok_or_else(|| AppError::Storage(format!("Not a stored image: {}", url)))?;
        tokio::fs::remove_file(self.upload_dir.join(name))
            .await
            .map_err(|e| AppError::Storage(format!("Cannot remove {}: {}", name, e)))?;
        Ok(name.to_string())
    }
}

/// Build the configured backend
pub fn from_config(config: &StorageConfig) -> AppResult<Box<dyn ImageStore>> {
    match config.backend {
        crate::config::StorageBackend::Cloudinary => {
            if config.cloudinary.cloud_name.is_empty() {
                return Err(AppError::Internal(
                    "Cloudinary storage selected but no cloud name configured".to_string(),
                ));
            }
            Ok(Box::new(CloudinaryStore::new(config.cloudinary.clone())?))
        }
        crate::config::StorageBackend::Local => Ok(Box::new(LocalStore::new(
            config.upload_dir.clone(),
            config.public_base_url.clone(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_public_id() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1712345678/easypublication/publication_1_2.png";
        assert_eq!(
            extract_public_id(url),
            Some("easypublication/publication_1_2")
        );
        assert_eq!(extract_public_id("/images/files-1.png"), None);
    }

    #[test]
    fn test_signature_is_order_independent() {
        let store = CloudinaryStore::new(CloudinaryConfig {
            api_secret: "secret".to_string(),
            ..CloudinaryConfig::default()
        })
        .unwrap();
        let a = store.sign(&[("timestamp", "1"), ("public_id", "x")]);
        let b = store.sign(&[("public_id", "x"), ("timestamp", "1")]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[tokio::test]
    async fn test_local_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path(), "/images/");

        let stored = store.store("Figure 1.PNG", vec![1, 2, 3]).await.unwrap();
        assert!(stored.url.starts_with("/images/files-"));
        assert!(stored.url.ends_with(".png"));
        assert!(dir.path().join(&stored.id).exists());

        let report = delete_images(
            &store,
            &[stored.url.clone(), "https://elsewhere/x.png".to_string()],
        )
        .await;
        assert_eq!(report.deleted, vec![stored.id.clone()]);
        assert_eq!(report.errors.len(), 1);
        assert!(!dir.path().join(&stored.id).exists());
    }

    #[test]
    fn test_local_store_rejects_traversal() {
        let store = LocalStore::new("/tmp/uploads", "/images");
        assert_eq!(store.file_name_for("/images/a.png"), Some("a.png"));
        assert_eq!(store.file_name_for("/images/../etc/passwd"), None);
        assert_eq!(store.file_name_for("/other/a.png"), None);
    }
}
