//! Object storage for trip photos.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::TripPhase;

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub public_url: String,
}

/// Object storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Stores binary objects and hands out their public URLs.
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError>;
}

/// Object key for a trip photo: `{booking_id}_{phase}_{unix_millis}.{ext}`.
pub fn photo_object_key(
    booking_id: Uuid,
    phase: TripPhase,
    at: DateTime<Utc>,
    extension: &str,
) -> String {
    format!(
        "{}_{}_{}.{}",
        booking_id,
        phase.as_str(),
        at.timestamp_millis(),
        extension
    )
}

/// In-memory object storage for development and testing.
#[derive(Debug, Clone, Default)]
pub struct MockObjectStorage {
    /// Whether to simulate upload failures.
    pub simulate_failure: bool,
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockObjectStorage {
    pub const PUBLIC_BASE_URL: &'static str = "https://storage.test/trip_images";

    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock storage whose uploads always fail.
    pub fn failing() -> Self {
        Self {
            simulate_failure: true,
            ..Self::default()
        }
    }

    /// Keys of every object stored so far.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().await.get(key).cloned()
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        if self.simulate_failure {
            tracing::warn!(key = %key, "Mock object storage simulating failure");
            return Err(StorageError::UploadFailed("Simulated failure".to_string()));
        }

        tracing::debug!(
            key = %key,
            content_type = %content_type,
            size = bytes.len(),
            "Mock: stored object"
        );
        self.objects.lock().await.insert(key.to_string(), bytes);

        Ok(StoredObject {
            key: key.to_string(),
            public_url: format!("{}/{}", Self::PUBLIC_BASE_URL, key),
        })
    }
}
