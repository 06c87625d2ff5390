use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    domain::video::{
        GenerateVideoRequest, GenerateVideoResponse, VideoGeneration, VideoGenerationService,
        VideoGenerationServiceApi,
    },
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
};

pub struct VideoController {
    video_service: Arc<VideoGenerationService>,
}

impl VideoController {
    pub fn new(video_service: Arc<VideoGenerationService>) -> Self {
        Self { video_service }
    }

    /// POST /api/video-generations - Generate the avatar video for a user
    pub async fn generate(
        State(controller): State<Arc<VideoController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<GenerateVideoRequest>,
    ) -> AppResult<Json<GenerateVideoResponse>> {
        let user_id = request
            .user_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest("User ID is required".to_string()))?;

        tracing::info!(
            caller = %auth_user.user_id,
            user_id = %user_id,
            "On-demand video generation requested"
        );

        // Detached from the request so a dropped connection does not abort the attempt
        let service = controller.video_service.clone();
        let video_url = tokio::spawn(async move { service.generate_on_demand(&user_id).await })
            .await
            .map_err(|e| AppError::Internal(format!("Video generation task failed: {}", e)))??;

        Ok(Json(GenerateVideoResponse {
            success: true,
            video_url,
        }))
    }

    /// GET /api/video-generations/:userId - Current tracking record
    pub async fn get_status(
        State(controller): State<Arc<VideoController>>,
        Path(user_id): Path<String>,
    ) -> AppResult<Json<VideoGeneration>> {
        let generation = controller.video_service.get_status(&user_id).await?;
        Ok(Json(generation))
    }
}
