use crate::domain::video::VideoGenerationError;
use async_trait::async_trait;
use std::time::Duration;

/// Binary artifact storage with time-limited read URLs.
///
/// Uploads are all-or-nothing and overwrite whatever lives under the key,
/// so a retried attempt reuses the same object names.
#[async_trait]
pub trait ObjectStoreRepository: Send + Sync {
    /// Upload `bytes` under `key` with the given content type
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), VideoGenerationError>;

    /// Time-limited read URL for an object that already exists
    async fn signed_url(&self, key: &str, expires_in: Duration)
        -> Result<String, VideoGenerationError>;

    /// Upload, then sign. The URL is only produced once the upload succeeded.
    async fn store(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<String, VideoGenerationError> {
        self.put(key, bytes, content_type).await?;
        self.signed_url(key, expires_in).await
    }
}
