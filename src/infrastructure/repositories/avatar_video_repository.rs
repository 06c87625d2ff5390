use crate::domain::video::VideoGenerationError;
use async_trait::async_trait;
use std::time::Duration;

/// Repository for talking-avatar video synthesis.
/// Turns a publicly readable narration audio URL into a finished video.
#[async_trait]
pub trait AvatarVideoRepository: Send + Sync {
    /// Upload the audio asset, submit the job and poll it to completion.
    /// Returns the provider-hosted URL of the finished video.
    ///
    /// # Errors
    /// - `Upstream` on any non-2xx answer (not retried)
    /// - `JobFailed` when the provider reports the job failed
    /// - `Timeout` when the job is still running after the last status check
    async fn generate_video(&self, audio_url: &str) -> Result<String, VideoGenerationError>;

    /// Fetch the finished video bytes from the provider
    async fn download_video(&self, video_url: &str) -> Result<Vec<u8>, VideoGenerationError>;
}

/// Pause between job status checks
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
