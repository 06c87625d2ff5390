use super::error::VideoGenerationError;
use super::model::{ArtifactKind, GenerationMode, QuizResult, StatusUpdate, VideoGeneration};
use crate::infrastructure::config::Config;
use crate::infrastructure::repositories::{
    AvatarVideoRepository, ObjectStoreRepository, QuizResultRepository, TtsRepository,
    VideoGenerationRepository,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Budget and URL lifetimes for one pipeline attempt
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub pipeline_timeout: Duration,
    pub audio_url_ttl_on_demand: Duration,
    pub artifact_url_ttl: Duration,
}

impl From<&Config> for PipelineSettings {
    fn from(config: &Config) -> Self {
        Self {
            pipeline_timeout: config.pipeline_timeout(),
            audio_url_ttl_on_demand: Duration::from_secs(config.audio_url_ttl_on_demand_secs),
            artifact_url_ttl: Duration::from_secs(config.artifact_url_ttl_secs),
        }
    }
}

impl PipelineSettings {
    fn audio_url_ttl(&self, mode: GenerationMode) -> Duration {
        match mode {
            GenerationMode::OnDemand => self.audio_url_ttl_on_demand,
            GenerationMode::Reactive => self.artifact_url_ttl,
        }
    }
}

/// URLs produced by a successful attempt
#[derive(Debug, Clone, PartialEq)]
pub struct VideoGenerationOutcome {
    pub audio_url: String,
    pub video_url: String,
}

pub struct VideoGenerationService {
    video_repo: Arc<dyn VideoGenerationRepository>,
    quiz_repo: Arc<dyn QuizResultRepository>,
    tts_repo: Arc<dyn TtsRepository>,
    object_store: Arc<dyn ObjectStoreRepository>,
    avatar_repo: Arc<dyn AvatarVideoRepository>,
    settings: PipelineSettings,
}

impl VideoGenerationService {
    pub fn new(
        video_repo: Arc<dyn VideoGenerationRepository>,
        quiz_repo: Arc<dyn QuizResultRepository>,
        tts_repo: Arc<dyn TtsRepository>,
        object_store: Arc<dyn ObjectStoreRepository>,
        avatar_repo: Arc<dyn AvatarVideoRepository>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            video_repo,
            quiz_repo,
            tts_repo,
            object_store,
            avatar_repo,
            settings,
        }
    }

    /// Run one attempt for `user_id`: narration, avatar video, tracking record.
    ///
    /// The record is (re)created at `pending` and then written once per
    /// finished step. Whatever goes wrong after creation is stored on the
    /// record as `error` before being returned.
    pub async fn generate(
        &self,
        user_id: &str,
        script: &str,
        mode: GenerationMode,
    ) -> Result<VideoGenerationOutcome, VideoGenerationError> {
        tracing::info!(user_id = %user_id, mode = %mode, script_length = script.len(), "Starting video generation");

        self.warn_if_in_flight(user_id).await;
        self.video_repo.create_attempt(user_id, script).await?;

        let start_time = std::time::Instant::now();
        let result = match tokio::time::timeout(
            self.settings.pipeline_timeout,
            self.run_attempt(user_id, script, mode),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(VideoGenerationError::Timeout(format!(
                "Video generation exceeded the {}s pipeline budget",
                self.settings.pipeline_timeout.as_secs()
            ))),
        };

        match result {
            Ok(outcome) => {
                tracing::info!(
                    user_id = %user_id,
                    mode = %mode,
                    latency_ms = start_time.elapsed().as_millis(),
                    "Video generation complete"
                );
                Ok(outcome)
            }
            Err(err) => {
                tracing::error!(
                    user_id = %user_id,
                    mode = %mode,
                    error = %err,
                    error_kind = ?err.kind(),
                    "Video generation failed"
                );
                self.record_failure(user_id, &err).await;
                Err(err)
            }
        }
    }

    async fn run_attempt(
        &self,
        user_id: &str,
        script: &str,
        mode: GenerationMode,
    ) -> Result<VideoGenerationOutcome, VideoGenerationError> {
        // 1. Narration audio
        let audio = self.tts_repo.synthesize(script).await?;
        tracing::info!(user_id = %user_id, audio_size_bytes = audio.len(), "Audio synthesized");

        let audio_url = self
            .object_store
            .store(
                &ArtifactKind::Audio.key(user_id),
                audio,
                ArtifactKind::Audio.content_type(),
                self.settings.audio_url_ttl(mode),
            )
            .await?;

        self.video_repo
            .update_status(
                user_id,
                StatusUpdate::AudioGenerated {
                    audio_url: audio_url.clone(),
                },
            )
            .await?;

        // 2. Avatar video
        let provider_video_url = self.avatar_repo.generate_video(&audio_url).await?;
        let video = self.avatar_repo.download_video(&provider_video_url).await?;
        tracing::info!(user_id = %user_id, video_size_bytes = video.len(), "Video downloaded");

        let video_url = self
            .object_store
            .store(
                &ArtifactKind::Video.key(user_id),
                video,
                ArtifactKind::Video.content_type(),
                self.settings.artifact_url_ttl,
            )
            .await?;

        self.video_repo
            .update_status(
                user_id,
                StatusUpdate::Complete {
                    video_url: video_url.clone(),
                },
            )
            .await?;

        Ok(VideoGenerationOutcome {
            audio_url,
            video_url,
        })
    }

    async fn record_failure(&self, user_id: &str, err: &VideoGenerationError) {
        let update = StatusUpdate::Failed {
            message: err.to_string(),
        };

        if let Err(persist_err) = self.video_repo.update_status(user_id, update).await {
            tracing::error!(
                user_id = %user_id,
                error = %persist_err,
                original_error = %err,
                "Failed to record video generation error"
            );
        }
    }

    /// Concurrent attempts are last-writer-wins; make them visible in the logs
    async fn warn_if_in_flight(&self, user_id: &str) {
        match self.video_repo.find_by_user(user_id).await {
            Ok(Some(existing)) if !existing.status.is_terminal() => {
                tracing::warn!(
                    user_id = %user_id,
                    status = %existing.status,
                    started_at = %existing.created_at,
                    "Overwriting an in-flight video generation"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(user_id = %user_id, error = %e, "Could not read previous video generation");
            }
        }
    }
}

#[async_trait]
pub trait VideoGenerationServiceApi: Send + Sync {
    /// Generate the video for a user from their stored quiz result
    ///
    /// # Errors
    /// - `DataNotFound` when the quiz result or its script is missing
    /// - any pipeline error, after it was recorded on the tracking record
    async fn generate_on_demand(&self, user_id: &str) -> Result<String, VideoGenerationError>;

    /// Current tracking record for a user
    async fn get_status(&self, user_id: &str) -> Result<VideoGeneration, VideoGenerationError>;
}

#[async_trait]
impl VideoGenerationServiceApi for VideoGenerationService {
    async fn generate_on_demand(&self, user_id: &str) -> Result<String, VideoGenerationError> {
        let quiz_result = self
            .quiz_repo
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| VideoGenerationError::DataNotFound("Quiz results not found".to_string()))?;

        let script = quiz_result.script().ok_or_else(|| {
            VideoGenerationError::DataNotFound("Video script not found in quiz results".to_string())
        })?;

        let outcome = self
            .generate(user_id, script, GenerationMode::OnDemand)
            .await?;

        Ok(outcome.video_url)
    }

    async fn get_status(&self, user_id: &str) -> Result<VideoGeneration, VideoGenerationError> {
        self.video_repo
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| {
                VideoGenerationError::DataNotFound(format!(
                    "No video generation found for user {}",
                    user_id
                ))
            })
    }
}

/// Reacts to newly stored quiz results. Nobody awaits the outcome, so
/// failures end up on the tracking record and in the logs only.
#[async_trait]
pub trait QuizResultHandler: Send + Sync {
    async fn on_quiz_result_created(&self, quiz_result: QuizResult);
}

#[async_trait]
impl QuizResultHandler for VideoGenerationService {
    async fn on_quiz_result_created(&self, quiz_result: QuizResult) {
        let Some(script) = quiz_result.script() else {
            tracing::warn!(
                user_id = %quiz_result.user_id,
                "Quiz result has no video script, skipping video generation"
            );
            return;
        };

        if let Err(err) = self
            .generate(&quiz_result.user_id, script, GenerationMode::Reactive)
            .await
        {
            tracing::error!(
                user_id = %quiz_result.user_id,
                error = %err,
                "Reactive video generation failed"
            );
        }
    }
}
