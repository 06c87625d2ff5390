use crate::e2e::helpers;

use helpers::fakes::{InMemoryQuizResultRepository, RecordingHandler};
use helpers::TestContext;
use quizvid_backend::domain::video::VideoGenerationStatus;
use quizvid_backend::infrastructure::triggers::dispatch_notification;
use std::sync::Arc;
use test_context::test_context;

#[tokio::test]
async fn it_should_hand_notified_quiz_result_to_handler() {
    let quiz_repo = Arc::new(InMemoryQuizResultRepository::default());
    quiz_repo.insert_script("u1", "Hello world");
    let handler = Arc::new(RecordingHandler::default());

    dispatch_notification("u1".to_string(), quiz_repo, handler.clone()).await;

    let received = handler.received.lock();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].user_id, "u1");
    assert_eq!(received[0].script(), Some("Hello world"));
}

#[tokio::test]
async fn it_should_ignore_notification_for_unknown_quiz_result() {
    let quiz_repo = Arc::new(InMemoryQuizResultRepository::default());
    let handler = Arc::new(RecordingHandler::default());

    dispatch_notification("ghost".to_string(), quiz_repo, handler.clone()).await;

    assert!(handler.received.lock().is_empty());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_generate_video_from_notification(ctx: &TestContext) {
    ctx.quiz_repo.insert_script("u1", "Hello world");

    dispatch_notification(
        "u1".to_string(),
        ctx.quiz_repo.clone(),
        ctx.service.clone(),
    )
    .await;

    let record = ctx.video_repo.get("u1").unwrap();
    assert_eq!(record.status, VideoGenerationStatus::Complete);
    assert_eq!(record.video_url.as_deref(), Some("https://store/u1/video.mp4"));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_record_reactive_failure_without_surfacing_it(ctx: &TestContext) {
    ctx.quiz_repo.insert_script("u1", "Hello world");
    ctx.stub.state.fail_job(Some("Avatar rejected"));

    dispatch_notification(
        "u1".to_string(),
        ctx.quiz_repo.clone(),
        ctx.service.clone(),
    )
    .await;

    let record = ctx.video_repo.get("u1").unwrap();
    assert_eq!(record.status, VideoGenerationStatus::Error);
    assert_eq!(record.error.as_deref(), Some("Avatar rejected"));
}
