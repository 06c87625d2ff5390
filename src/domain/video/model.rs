use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Progress of one user's video generation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VideoGenerationStatus {
    Pending,
    AudioGenerated,
    /// Readers understand this value, the pipeline never writes it.
    VideoGenerated,
    Complete,
    Error,
}

impl VideoGenerationStatus {
    pub const ALL: [VideoGenerationStatus; 5] = [
        VideoGenerationStatus::Pending,
        VideoGenerationStatus::AudioGenerated,
        VideoGenerationStatus::VideoGenerated,
        VideoGenerationStatus::Complete,
        VideoGenerationStatus::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoGenerationStatus::Pending => "pending",
            VideoGenerationStatus::AudioGenerated => "audio_generated",
            VideoGenerationStatus::VideoGenerated => "video_generated",
            VideoGenerationStatus::Complete => "complete",
            VideoGenerationStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            VideoGenerationStatus::Complete | VideoGenerationStatus::Error
        )
    }

    /// Forward-only transitions within one attempt. Restarting at `Pending`
    /// is not a transition; it recreates the record.
    pub fn can_transition_to(&self, next: VideoGenerationStatus) -> bool {
        use VideoGenerationStatus::*;
        match (*self, next) {
            (Pending, AudioGenerated) => true,
            (AudioGenerated, VideoGenerated) | (AudioGenerated, Complete) => true,
            (VideoGenerated, Complete) => true,
            (current, Error) => !current.is_terminal(),
            _ => false,
        }
    }

    /// Statuses a record may be in for `next` to be written
    pub fn predecessors_of(next: VideoGenerationStatus) -> Vec<VideoGenerationStatus> {
        Self::ALL
            .into_iter()
            .filter(|status| status.can_transition_to(next))
            .collect()
    }
}

impl std::fmt::Display for VideoGenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracking record for a user's video, one row per user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VideoGeneration {
    pub user_id: String,
    pub script: String,
    pub status: VideoGenerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field set written by one pipeline step
#[derive(Debug, Clone, PartialEq)]
pub enum StatusUpdate {
    AudioGenerated { audio_url: String },
    Complete { video_url: String },
    Failed { message: String },
}

impl StatusUpdate {
    pub fn target_status(&self) -> VideoGenerationStatus {
        match self {
            StatusUpdate::AudioGenerated { .. } => VideoGenerationStatus::AudioGenerated,
            StatusUpdate::Complete { .. } => VideoGenerationStatus::Complete,
            StatusUpdate::Failed { .. } => VideoGenerationStatus::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("cannot move video generation from {from} to {to}")]
pub struct InvalidTransition {
    pub from: VideoGenerationStatus,
    pub to: VideoGenerationStatus,
}

impl VideoGeneration {
    /// Fresh `pending` record for a new attempt
    pub fn new_attempt(user_id: &str, script: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            script: script.to_string(),
            status: VideoGenerationStatus::Pending,
            audio_url: None,
            video_url: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply one step's field set. `audio_url` survives later steps,
    /// `video_url` only exists on `complete` and `error` only on `error`.
    pub fn apply(&mut self, update: StatusUpdate, now: DateTime<Utc>) -> Result<(), InvalidTransition> {
        let target = update.target_status();
        if !self.status.can_transition_to(target) {
            return Err(InvalidTransition {
                from: self.status,
                to: target,
            });
        }

        match update {
            StatusUpdate::AudioGenerated { audio_url } => {
                self.audio_url = Some(audio_url);
                self.video_url = None;
                self.error = None;
            }
            StatusUpdate::Complete { video_url } => {
                self.video_url = Some(video_url);
                self.error = None;
            }
            StatusUpdate::Failed { message } => {
                self.video_url = None;
                self.error = Some(message);
            }
        }

        self.status = target;
        self.updated_at = self.updated_at.max(now);
        Ok(())
    }
}

/// How an attempt was started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// A quiz result was stored; nobody awaits the outcome
    Reactive,
    /// An authenticated caller awaits the video URL
    OnDemand,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::Reactive => write!(f, "reactive"),
            GenerationMode::OnDemand => write!(f, "on_demand"),
        }
    }
}

/// Binary artifacts the pipeline stores per user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Audio,
    Video,
}

impl ArtifactKind {
    pub fn key(&self, user_id: &str) -> String {
        match self {
            ArtifactKind::Audio => format!("video_generations/{}/audio.mp3", user_id),
            ArtifactKind::Video => format!("video_generations/{}/video.mp4", user_id),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactKind::Audio => "audio/mpeg",
            ArtifactKind::Video => "video/mp4",
        }
    }
}

/// Quiz result row written upstream. `video_script` holds `{ "script": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizResult {
    pub user_id: String,
    pub video_script: Option<JsonValue>,
    pub created_at: DateTime<Utc>,
}

impl QuizResult {
    /// Narration text, if the upstream synthesis produced a non-blank one
    pub fn script(&self) -> Option<&str> {
        self.video_script
            .as_ref()
            .and_then(|value| value.get("script"))
            .and_then(|script| script.as_str())
            .filter(|script| !script.trim().is_empty())
    }
}
