pub mod error;
pub mod model;
pub mod service;

pub use error::{UpstreamError, VideoGenerationError, VideoGenerationErrorKind};
pub use model::{
    ArtifactKind, GenerationMode, InvalidTransition, QuizResult, StatusUpdate, VideoGeneration,
    VideoGenerationStatus,
};
pub use service::{
    PipelineSettings, QuizResultHandler, VideoGenerationOutcome, VideoGenerationService,
    VideoGenerationServiceApi,
};

use serde::{Deserialize, Serialize};

/// Request for POST /api/video-generations
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoRequest {
    pub user_id: Option<String>,
}

/// Response for POST /api/video-generations
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateVideoResponse {
    pub success: bool,
    pub video_url: String,
}
