//! HTTP object storage client for trip photos.
//!
//! Speaks the storage REST layout `{base_url}/object/{bucket}/{key}` for
//! uploads and serves objects from the public bucket path.

use async_trait::async_trait;
use domain::services::{ObjectStorage, StorageError, StoredObject};
use reqwest::{header, Client};
use std::time::Duration;

use crate::config::StorageConfig;

/// Uploads objects to a bucket over HTTP.
pub struct HttpObjectStorage {
    http_client: Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

impl HttpObjectStorage {
    pub fn new(config: &StorageConfig) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            service_key: config.service_key.clone(),
        })
    }

    fn upload_url(&self, key: &str) -> String {
        format!("{}/object/{}/{}", self.base_url, self.bucket, key)
    }

    /// Public URL an uploaded object is served from.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/object/public/{}/{}", self.base_url, self.bucket, key)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        if self.base_url.is_empty() {
            return Err(StorageError::Unavailable(
                "storage base_url is not configured".to_string(),
            ));
        }

        let size = bytes.len();
        let response = self
            .http_client
            .post(self.upload_url(key))
            .bearer_auth(&self.service_key)
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(key = %key, status = status.as_u16(), body = %body, "Photo upload rejected");
            return Err(StorageError::UploadFailed(format!("HTTP {}", status)));
        }

        tracing::info!(key = %key, size = size, "Photo uploaded");
        Ok(StoredObject {
            key: key.to_string(),
            public_url: self.public_url(key),
        })
    }
}
