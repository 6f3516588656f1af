use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use scout_core::{Error, ImageUploader, Result, UploadedImage};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

pub const CLOUDINARY_API_URL: &str = "https://api.cloudinary.com";

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
}

impl CloudinaryConfig {
    pub fn new(cloud_name: impl Into<String>, api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            base_url: CLOUDINARY_API_URL.to_string(),
        }
    }
}

impl fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

/// Signed uploads to Cloudinary from a remote image URL
#[derive(Debug)]
pub struct CloudinaryUploader {
    client: Arc<Client>,
    config: CloudinaryConfig,
}

impl CloudinaryUploader {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: Arc::new(Client::new()),
            config,
        }
    }

    /// SHA-256 over the alphabetically sorted `key=value` pairs followed by the secret
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted = params.to_vec();
        sorted.sort_by(|a, b| a.0.cmp(b.0));
        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.config.api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[async_trait]
impl ImageUploader for CloudinaryUploader {
    async fn upload_remote(&self, image_url: &str, folder: &str) -> Result<UploadedImage> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder), ("timestamp", &timestamp)]);
        let endpoint = format!(
            "{}/v1_1/{}/image/upload",
            self.config.base_url.trim_end_matches('/'),
            self.config.cloud_name
        );

        debug!("Uploading {} to {}", image_url, endpoint);
        let response = self
            .client
            .post(&endpoint)
            .form(&[
                ("file", image_url),
                ("api_key", self.config.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("folder", folder),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Upload(format!("Cloudinary returned {}: {}", status, detail.trim())));
        }

        let uploaded: UploadResponse = response.json().await?;
        Ok(UploadedImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }
}

/// Keeps the generated image where the model put it
#[derive(Debug, Default)]
pub struct PassthroughUploader;

#[async_trait]
impl ImageUploader for PassthroughUploader {
    async fn upload_remote(&self, image_url: &str, folder: &str) -> Result<UploadedImage> {
        let name = image_url.rsplit('/').next().unwrap_or(image_url);
        Ok(UploadedImage {
            url: image_url.to_string(),
            public_id: format!("{}/{}", folder, name),
        })
    }
}

/// Cloudinary when configured, otherwise the passthrough uploader
pub fn create_uploader(config: Option<CloudinaryConfig>) -> Arc<dyn ImageUploader> {
    match config {
        Some(config) => Arc::new(CloudinaryUploader::new(config)),
        None => Arc::new(PassthroughUploader),
    }
}
