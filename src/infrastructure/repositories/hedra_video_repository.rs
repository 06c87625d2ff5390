use super::avatar_video_repository::{AvatarVideoRepository, Sleeper};
use crate::domain::video::{UpstreamError, VideoGenerationError};
use crate::infrastructure::config::Config;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const SERVICE: &str = "Hedra";
const API_KEY_HEADER: &str = "X-API-KEY";

const AUDIO_UPLOAD: &str = "audio upload";
const VIDEO_GENERATION: &str = "video generation";
const STATUS_CHECK: &str = "status check";
const VIDEO_DOWNLOAD: &str = "video download";

const DEFAULT_FAILURE_MESSAGE: &str = "Video generation failed";

#[derive(Debug, Clone)]
pub struct HedraSettings {
    pub base_url: String,
    pub api_key: String,
    pub avatar_image_url: String,
    pub aspect_ratio: String,
    pub poll_interval: Duration,
    pub max_attempts: u32,
    pub request_timeout: Duration,
}

impl From<&Config> for HedraSettings {
    fn from(config: &Config) -> Self {
        Self {
            base_url: config.hedra_base_url.clone(),
            api_key: config.hedra_api_key.clone(),
            avatar_image_url: config.avatar_image_url.clone(),
            aspect_ratio: config.video_aspect_ratio.clone(),
            poll_interval: config.poll_interval(),
            max_attempts: config.poll_max_attempts(),
            request_timeout: config.http_request_timeout(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AudioUploadRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct AudioUploadResponse {
    url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CharacterRequest<'a> {
    avatar_image: &'a str,
    audio_source: &'a str,
    voice_url: &'a str,
    aspect_ratio: &'a str,
    text: &'a str,
    voice_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterResponse {
    job_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatusResponse {
    status: Option<String>,
    video_url: Option<String>,
    error_message: Option<String>,
}

#[derive(Debug, PartialEq)]
enum JobState {
    Completed(String),
    Failed(String),
    Running,
}

impl JobStatusResponse {
    fn classify(self) -> JobState {
        let status = self.status.unwrap_or_default().to_lowercase();
        let error_message = self.error_message.filter(|m| !m.trim().is_empty());

        if status == "completed" {
            if let Some(video_url) = self.video_url.filter(|u| !u.is_empty()) {
                return JobState::Completed(video_url);
            }
        }

        if status == "failed" || error_message.is_some() {
            return JobState::Failed(
                error_message.unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
            );
        }

        JobState::Running
    }
}

/// Hedra avatar API client (audio asset, character job, project polling)
pub struct HedraVideoRepository {
    http_client: reqwest::Client,
    settings: HedraSettings,
    sleeper: Arc<dyn Sleeper>,
}

impl HedraVideoRepository {
    pub fn new(mut settings: HedraSettings, sleeper: Arc<dyn Sleeper>) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        settings.base_url = settings.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            http_client,
            settings,
            sleeper,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url, path)
    }

    /// Send a request and turn transport failures and non-2xx answers into
    /// `UpstreamError`s carrying the response body
    async fn send_checked(
        &self,
        request: reqwest::RequestBuilder,
        operation: &'static str,
    ) -> Result<reqwest::Response, UpstreamError> {
        let response = request
            .header(API_KEY_HEADER, &self.settings.api_key)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport {
                service: SERVICE,
                operation,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(operation = operation, status = status, body = %body, "Hedra request rejected");
            return Err(UpstreamError::Status {
                service: SERVICE,
                operation,
                status,
                body,
            });
        }

        Ok(response)
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<T, UpstreamError> {
        response.json::<T>().await.map_err(|e| UpstreamError::Malformed {
            service: SERVICE,
            operation,
            message: e.to_string(),
        })
    }

    /// Register the narration audio with Hedra, returns the hosted audio URL
    async fn upload_audio(&self, audio_url: &str) -> Result<String, UpstreamError> {
        let request = self
            .http_client
            .post(self.url("/v1/audio"))
            .json(&AudioUploadRequest { url: audio_url });

        let response = self.send_checked(request, AUDIO_UPLOAD).await?;
        let uploaded: AudioUploadResponse = Self::read_json(response, AUDIO_UPLOAD).await?;

        tracing::debug!(hosted_audio_url = %uploaded.url, "Audio registered with Hedra");
        Ok(uploaded.url)
    }

    async fn create_job(&self, voice_url: &str) -> Result<String, UpstreamError> {
        let request = self
            .http_client
            .post(self.url("/v1/characters"))
            .json(&CharacterRequest {
                avatar_image: &self.settings.avatar_image_url,
                audio_source: "audio",
                voice_url,
                aspect_ratio: &self.settings.aspect_ratio,
                text: "",
                voice_id: None,
            });

        let response = self.send_checked(request, VIDEO_GENERATION).await?;
        let created: CharacterResponse = Self::read_json(response, VIDEO_GENERATION).await?;

        tracing::info!(job_id = %created.job_id, "Video generation started");
        Ok(created.job_id)
    }

    async fn fetch_job_status(&self, job_id: &str) -> Result<JobState, UpstreamError> {
        let request = self
            .http_client
            .get(self.url(&format!("/v1/projects/{}", job_id)));

        let response = self.send_checked(request, STATUS_CHECK).await?;
        let status: JobStatusResponse = Self::read_json(response, STATUS_CHECK).await?;

        tracing::debug!(job_id = %job_id, status = ?status.status, "Video status");
        Ok(status.classify())
    }

    /// Check the job at most `max_attempts` times, sleeping between checks
    /// but never after the last one
    async fn poll_until_complete(&self, job_id: &str) -> Result<String, VideoGenerationError> {
        let max_attempts = self.settings.max_attempts;

        for attempt in 1..=max_attempts {
            match self.fetch_job_status(job_id).await? {
                JobState::Completed(video_url) => {
                    tracing::info!(job_id = %job_id, attempt = attempt, "Video generation completed");
                    return Ok(video_url);
                }
                JobState::Failed(message) => {
                    tracing::warn!(job_id = %job_id, attempt = attempt, message = %message, "Video generation job failed");
                    return Err(VideoGenerationError::JobFailed(message));
                }
                JobState::Running => {
                    if attempt < max_attempts {
                        self.sleeper.sleep(self.settings.poll_interval).await;
                    }
                }
            }
        }

        Err(VideoGenerationError::Timeout(format!(
            "Video generation timed out after {} status checks",
            max_attempts
        )))
    }
}

#[async_trait]
impl AvatarVideoRepository for HedraVideoRepository {
    async fn generate_video(&self, audio_url: &str) -> Result<String, VideoGenerationError> {
        let start_time = std::time::Instant::now();

        let hosted_audio_url = self.upload_audio(audio_url).await?;
        let job_id = self.create_job(&hosted_audio_url).await?;
        let video_url = self.poll_until_complete(&job_id).await?;

        tracing::info!(
            provider = "hedra",
            job_id = %job_id,
            latency_ms = start_time.elapsed().as_millis(),
            "Avatar video ready"
        );

        Ok(video_url)
    }

    async fn download_video(&self, video_url: &str) -> Result<Vec<u8>, VideoGenerationError> {
        let response = self
            .http_client
            .get(video_url)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport {
                service: SERVICE,
                operation: VIDEO_DOWNLOAD,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(UpstreamError::Status {
                service: SERVICE,
                operation: VIDEO_DOWNLOAD,
                status,
                body,
            }
            .into());
        }

        let bytes = response.bytes().await.map_err(|e| UpstreamError::Malformed {
            service: SERVICE,
            operation: VIDEO_DOWNLOAD,
            message: e.to_string(),
        })?;

        tracing::debug!(size_bytes = bytes.len(), "Video downloaded");
        Ok(bytes.to_vec())
    }
}
