use crate::domain::video::QuizResultHandler;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::repositories::QuizResultRepository;
use anyhow::Context;
use sqlx::postgres::PgListener;
use std::sync::Arc;
use std::time::Duration;

/// Channel the `quiz_result_created` trigger in `migrations/` notifies on
pub const QUIZ_RESULTS_CHANNEL: &str = "quiz_results_created";

/// Turns `pg_notify(QUIZ_RESULTS_CHANNEL, user_id)` events from the quiz
/// results trigger into reactive video generation runs, one task per
/// notification.
pub struct QuizResultListener {
    pool: Arc<DbPool>,
    quiz_repo: Arc<dyn QuizResultRepository>,
    handler: Arc<dyn QuizResultHandler>,
}

impl QuizResultListener {
    pub fn new(
        pool: Arc<DbPool>,
        quiz_repo: Arc<dyn QuizResultRepository>,
        handler: Arc<dyn QuizResultHandler>,
    ) -> Self {
        Self {
            pool,
            quiz_repo,
            handler,
        }
    }

    /// Listen until the process stops. `PgListener` reconnects on its own
    /// after a dropped connection; notifications sent meanwhile are lost.
    pub async fn run(self) -> anyhow::Result<()> {
        let mut listener = PgListener::connect_with(&self.pool)
            .await
            .context("failed to open quiz results listener connection")?;
        listener
            .listen(QUIZ_RESULTS_CHANNEL)
            .await
            .with_context(|| format!("failed to LISTEN on {}", QUIZ_RESULTS_CHANNEL))?;

        tracing::info!(channel = QUIZ_RESULTS_CHANNEL, "Listening for new quiz results");

        loop {
            match listener.recv().await {
                Ok(notification) => {
                    let user_id = notification.payload().trim().to_string();
                    if user_id.is_empty() {
                        tracing::warn!(channel = QUIZ_RESULTS_CHANNEL, "Ignoring quiz result notification without user id");
                        continue;
                    }

                    tracing::debug!(user_id = %user_id, "Quiz result notification received");
                    tokio::spawn(dispatch_notification(
                        user_id,
                        self.quiz_repo.clone(),
                        self.handler.clone(),
                    ));
                }
                Err(e) => {
                    tracing::error!(error = %e, channel = QUIZ_RESULTS_CHANNEL, "Quiz results listener error");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// Load the quiz result a notification points at and hand it to the handler
pub async fn dispatch_notification(
    user_id: String,
    quiz_repo: Arc<dyn QuizResultRepository>,
    handler: Arc<dyn QuizResultHandler>,
) {
    match quiz_repo.find_by_user(&user_id).await {
        Ok(Some(quiz_result)) => handler.on_quiz_result_created(quiz_result).await,
        Ok(None) => {
            tracing::warn!(user_id = %user_id, "Notified quiz result does not exist");
        }
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Failed to load notified quiz result");
        }
    }
}
