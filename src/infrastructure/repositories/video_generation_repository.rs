use crate::domain::video::{InvalidTransition, StatusUpdate, VideoGeneration, VideoGenerationStatus};
use crate::error::{AppError, AppResult};
use crate::infrastructure::db::{check_connection, DbPool};
use async_trait::async_trait;
use std::sync::Arc;

/// Persistence for the per-user tracking record
#[async_trait]
pub trait VideoGenerationRepository: Send + Sync {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<VideoGeneration>>;

    /// Create the record at `pending`, overwriting any previous attempt
    async fn create_attempt(&self, user_id: &str, script: &str) -> AppResult<VideoGeneration>;

    /// Write one step's fields. Fails with `Conflict` when the stored status
    /// does not allow the move and `NotFound` when there is no record.
    async fn update_status(&self, user_id: &str, update: StatusUpdate) -> AppResult<VideoGeneration>;

    async fn ping(&self) -> AppResult<()>;
}

pub struct PgVideoGenerationRepository {
    pool: Arc<DbPool>,
}

impl PgVideoGenerationRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoGenerationRepository for PgVideoGenerationRepository {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<VideoGeneration>> {
        let pool = self.pool.as_ref();
        let generation = sqlx::query_as::<_, VideoGeneration>(
            "SELECT * FROM video_generations WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(generation)
    }

    async fn create_attempt(&self, user_id: &str, script: &str) -> AppResult<VideoGeneration> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        let generation = sqlx::query_as::<_, VideoGeneration>(
            r#"
            INSERT INTO video_generations (user_id, script, status, audio_url, video_url, error, created_at, updated_at)
            VALUES ($1, $2, $3, NULL, NULL, NULL, $4, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                script = EXCLUDED.script,
                status = EXCLUDED.status,
                audio_url = NULL,
                video_url = NULL,
                error = NULL,
                created_at = EXCLUDED.created_at,
                updated_at = GREATEST(video_generations.updated_at, EXCLUDED.updated_at)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(script)
        .bind(VideoGenerationStatus::Pending)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(generation)
    }

    async fn update_status(&self, user_id: &str, update: StatusUpdate) -> AppResult<VideoGeneration> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();
        let target = update.target_status();
        let allowed_from: Vec<String> = VideoGenerationStatus::predecessors_of(target)
            .iter()
            .map(|status| status.as_str().to_string())
            .collect();

        // audio_url is only ever set, later steps keep it
        let (audio_url, video_url, error) = match update {
            StatusUpdate::AudioGenerated { audio_url } => (Some(audio_url), None, None),
            StatusUpdate::Complete { video_url } => (None, Some(video_url), None),
            StatusUpdate::Failed { message } => (None, None, Some(message)),
        };

        let updated = sqlx::query_as::<_, VideoGeneration>(
            r#"
            UPDATE video_generations
            SET status = $2,
                audio_url = COALESCE($3, audio_url),
                video_url = $4,
                error = $5,
                updated_at = GREATEST(updated_at, $6)
            WHERE user_id = $1 AND status = ANY($7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(target)
        .bind(audio_url)
        .bind(video_url)
        .bind(error)
        .bind(now)
        .bind(allowed_from)
        .fetch_optional(pool)
        .await?;

        if let Some(generation) = updated {
            return Ok(generation);
        }

        match self.find_by_user(user_id).await? {
            Some(current) => Err(AppError::Conflict(
                InvalidTransition {
                    from: current.status,
                    to: target,
                }
                .to_string(),
            )),
            None => Err(AppError::NotFound(format!(
                "Video generation for user {} not found",
                user_id
            ))),
        }
    }

    async fn ping(&self) -> AppResult<()> {
        check_connection(&self.pool).await?;
        Ok(())
    }
}
