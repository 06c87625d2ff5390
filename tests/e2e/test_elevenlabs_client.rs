use crate::e2e::helpers;

use helpers::upstream_stub::{StubStep, UpstreamStub};
use pretty_assertions::assert_eq;
use quizvid_backend::domain::video::{UpstreamError, VideoGenerationError};
use quizvid_backend::infrastructure::repositories::{ElevenLabsTtsRepository, TtsRepository};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn speech_client(base_url: &str) -> ElevenLabsTtsRepository {
    ElevenLabsTtsRepository::new(
        base_url.to_string(),
        "test-elevenlabs-key".to_string(),
        "cgSgspJ2msm6clMCkdW9".to_string(),
        "eleven_flash_v2_5".to_string(),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn it_should_concatenate_streamed_audio() {
    let stub = UpstreamStub::start().await;

    let audio = speech_client(&stub.base_url)
        .synthesize("Hello world")
        .await
        .unwrap();

    assert_eq!(audio, b"abcd".to_vec());
    assert_eq!(
        *stub.state.last_speech_body.lock(),
        Some(json!({ "text": "Hello world", "model_id": "eleven_flash_v2_5" }))
    );
    assert_eq!(
        *stub.state.api_keys.lock(),
        vec!["test-elevenlabs-key".to_string()]
    );
}

#[tokio::test]
async fn it_should_fail_with_status_and_body() {
    let stub = UpstreamStub::start().await;
    stub.state.fail(StubStep::Speech, 401, "invalid api key");

    let err = speech_client(&stub.base_url)
        .synthesize("Hello world")
        .await
        .unwrap_err();

    match &err {
        VideoGenerationError::AudioSynthesis(UpstreamError::Status { status, body, .. }) => {
            assert_eq!(*status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        err.to_string(),
        "audio synthesis failed: ElevenLabs speech synthesis failed with status 401: invalid api key"
    );
}

#[tokio::test]
async fn it_should_not_retry_failed_synthesis() {
    let stub = UpstreamStub::start().await;
    stub.state.fail(StubStep::Speech, 500, "overloaded");

    let client = speech_client(&stub.base_url);
    assert!(client.synthesize("Hello world").await.is_err());

    assert_eq!(stub.state.speech_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn it_should_report_unreachable_provider() {
    // Port 9 (discard) is not listening on loopback
    let err = speech_client("http://127.0.0.1:9")
        .synthesize("Hello world")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        VideoGenerationError::AudioSynthesis(UpstreamError::Transport { .. })
    ));
}
