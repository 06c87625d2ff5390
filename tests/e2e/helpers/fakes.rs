use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use quizvid_backend::{
    domain::video::{
        QuizResult, QuizResultHandler, StatusUpdate, UpstreamError, VideoGeneration,
        VideoGenerationError,
    },
    error::{AppError, AppResult},
    infrastructure::repositories::{
        AvatarVideoRepository, ObjectStoreRepository, QuizResultRepository, Sleeper,
        TtsRepository, VideoGenerationRepository,
    },
};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Tracking records kept in memory; every write is appended to `history`
#[derive(Default)]
pub struct InMemoryVideoGenerationRepository {
    records: Mutex<HashMap<String, VideoGeneration>>,
    history: Mutex<Vec<VideoGeneration>>,
    unavailable: AtomicBool,
}

impl InMemoryVideoGenerationRepository {
    pub fn get(&self, user_id: &str) -> Option<VideoGeneration> {
        self.records.lock().get(user_id).cloned()
    }

    pub fn history_for(&self, user_id: &str) -> Vec<VideoGeneration> {
        self.history
            .lock()
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn insert(&self, record: VideoGeneration) {
        self.records.lock().insert(record.user_id.clone(), record);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Internal("tracking store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl VideoGenerationRepository for InMemoryVideoGenerationRepository {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<VideoGeneration>> {
        self.check_available()?;
        Ok(self.get(user_id))
    }

    async fn create_attempt(&self, user_id: &str, script: &str) -> AppResult<VideoGeneration> {
        self.check_available()?;
        let mut records = self.records.lock();
        let mut record = VideoGeneration::new_attempt(user_id, script, Utc::now());
        if let Some(previous) = records.get(user_id) {
            record.updated_at = record.updated_at.max(previous.updated_at);
        }

        records.insert(user_id.to_string(), record.clone());
        self.history.lock().push(record.clone());
        Ok(record)
    }

    async fn update_status(&self, user_id: &str, update: StatusUpdate) -> AppResult<VideoGeneration> {
        self.check_available()?;
        let mut records = self.records.lock();
        let record = records
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("Video generation for user {} not found", user_id)))?;

        record
            .apply(update, Utc::now())
            .map_err(|e| AppError::Conflict(e.to_string()))?;

        self.history.lock().push(record.clone());
        Ok(record.clone())
    }

    async fn ping(&self) -> AppResult<()> {
        self.check_available()
    }
}

#[derive(Default)]
pub struct InMemoryQuizResultRepository {
    results: Mutex<HashMap<String, QuizResult>>,
}

impl InMemoryQuizResultRepository {
    pub fn insert_script(&self, user_id: &str, script: &str) {
        self.insert(QuizResult {
            user_id: user_id.to_string(),
            video_script: Some(json!({ "script": script })),
            created_at: Utc::now(),
        });
    }

    pub fn insert(&self, quiz_result: QuizResult) {
        self.results
            .lock()
            .insert(quiz_result.user_id.clone(), quiz_result);
    }
}

#[async_trait]
impl QuizResultRepository for InMemoryQuizResultRepository {
    async fn find_by_user(&self, user_id: &str) -> AppResult<Option<QuizResult>> {
        Ok(self.results.lock().get(user_id).cloned())
    }
}

/// Object store that signs `video_generations/{user}/{file}` as `https://store/{user}/{file}`
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    signed: Mutex<Vec<(String, Duration)>>,
    fail_puts: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn object(&self, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects.lock().get(key).cloned()
    }

    pub fn signed(&self) -> Vec<(String, Duration)> {
        self.signed.lock().clone()
    }

    pub fn set_fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStoreRepository for InMemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), VideoGenerationError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(VideoGenerationError::Storage(format!(
                "failed to upload {}: bucket unavailable",
                key
            )));
        }
        self.objects
            .lock()
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    async fn signed_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, VideoGenerationError> {
        if !self.objects.lock().contains_key(key) {
            return Err(VideoGenerationError::Storage(format!("no object at {}", key)));
        }
        self.signed.lock().push((key.to_string(), expires_in));
        let path = key.trim_start_matches("video_generations/");
        Ok(format!("https://store/{}", path))
    }
}

/// Speech synthesizer returning fixed audio, or a configured failure
pub struct ScriptedTts {
    audio: Vec<u8>,
    failure: Mutex<Option<UpstreamError>>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedTts {
    pub fn new(audio: &[u8]) -> Self {
        Self {
            audio: audio.to_vec(),
            failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_with(&self, failure: UpstreamError) {
        *self.failure.lock() = Some(failure);
    }
}

#[async_trait]
impl TtsRepository for ScriptedTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VideoGenerationError> {
        self.calls.lock().push(text.to_string());
        match self.failure.lock().clone() {
            Some(failure) => Err(VideoGenerationError::AudioSynthesis(failure)),
            None => Ok(self.audio.clone()),
        }
    }
}

/// One scripted outcome of `generate_video`
pub enum ScriptedVideo {
    Ready(String),
    Fail(VideoGenerationError),
    /// Never finishes within any reasonable pipeline budget
    Hang,
}

/// Avatar client replaying queued outcomes, `Ready(default_url)` once drained
pub struct ScriptedAvatar {
    default_url: String,
    video: Vec<u8>,
    outcomes: Mutex<VecDeque<ScriptedVideo>>,
    pub generate_calls: Mutex<Vec<String>>,
    pub download_calls: Mutex<Vec<String>>,
}

impl ScriptedAvatar {
    pub fn new(default_url: &str, video: &[u8]) -> Self {
        Self {
            default_url: default_url.to_string(),
            video: video.to_vec(),
            outcomes: Mutex::new(VecDeque::new()),
            generate_calls: Mutex::new(Vec::new()),
            download_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, outcome: ScriptedVideo) {
        self.outcomes.lock().push_back(outcome);
    }
}

#[async_trait]
impl AvatarVideoRepository for ScriptedAvatar {
    async fn generate_video(&self, audio_url: &str) -> Result<String, VideoGenerationError> {
        self.generate_calls.lock().push(audio_url.to_string());
        let outcome = self.outcomes.lock().pop_front();
        match outcome {
            Some(ScriptedVideo::Ready(url)) => Ok(url),
            Some(ScriptedVideo::Fail(err)) => Err(err),
            Some(ScriptedVideo::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(self.default_url.clone())
            }
            None => Ok(self.default_url.clone()),
        }
    }

    async fn download_video(&self, video_url: &str) -> Result<Vec<u8>, VideoGenerationError> {
        self.download_calls.lock().push(video_url.to_string());
        Ok(self.video.clone())
    }
}

/// Sleeper that returns immediately and remembers what it was asked for
#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}

/// Handler that only records which quiz results it was given
#[derive(Default)]
pub struct RecordingHandler {
    pub received: Mutex<Vec<QuizResult>>,
}

#[async_trait]
impl QuizResultHandler for RecordingHandler {
    async fn on_quiz_result_created(&self, quiz_result: QuizResult) {
        self.received.lock().push(quiz_result);
    }
}
