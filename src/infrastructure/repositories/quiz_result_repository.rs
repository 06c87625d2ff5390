use crate::domain::video::QuizResult;
use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use async_trait::async_trait;
use std::sync::Arc;

/// Read access to quiz results written by the quiz flow
#[async_trait]
pub trait QuizResultRepository: Send + Sync {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<QuizResult>>;
}

pub struct PgQuizResultRepository {
    pool: Arc<DbPool>,
}

impl PgQuizResultRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizResultRepository for PgQuizResultRepository {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<QuizResult>> {
        let pool = self.pool.as_ref();
        let quiz_result = sqlx::query_as::<_, QuizResult>(
            "SELECT user_id, video_script, created_at FROM quiz_results WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(quiz_result)
    }
}
