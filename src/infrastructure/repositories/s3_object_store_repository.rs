use super::object_store_repository::ObjectStoreRepository;
use crate::domain::video::VideoGenerationError;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{presigning::PresigningConfig, primitives::ByteStream, Client as S3Client};
use std::time::Duration;

/// S3 (or S3-compatible) implementation of the object store
pub struct S3ObjectStoreRepository {
    s3_client: S3Client,
    bucket: String,
}

impl S3ObjectStoreRepository {
    pub fn new(s3_client: S3Client, bucket: String) -> Self {
        Self { s3_client, bucket }
    }

    /// Build the client from the shared AWS config. A custom endpoint switches
    /// to path-style addressing, which MinIO and friends require.
    pub fn from_sdk_config(sdk_config: &SdkConfig, bucket: String, endpoint: Option<&str>) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
        if let Some(endpoint) = endpoint {
            tracing::info!(endpoint = %endpoint, "Using custom object storage endpoint");
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(S3Client::from_conf(builder.build()), bucket)
    }
}

#[async_trait]
impl ObjectStoreRepository for S3ObjectStoreRepository {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), VideoGenerationError> {
        let size = bytes.len();

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, bucket = %self.bucket, key = %key, "S3 put_object failed");
                VideoGenerationError::Storage(format!("failed to upload {}: {}", key, e))
            })?;

        tracing::debug!(bucket = %self.bucket, key = %key, size_bytes = size, "Object uploaded");
        Ok(())
    }

    async fn signed_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, VideoGenerationError> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| {
            VideoGenerationError::Storage(format!("invalid URL expiry {:?}: {}", expires_in, e))
        })?;

        let request = self
            .s3_client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, bucket = %self.bucket, key = %key, "S3 presign failed");
                VideoGenerationError::Storage(format!("failed to sign URL for {}: {}", key, e))
            })?;

        Ok(request.uri().to_string())
    }
}
