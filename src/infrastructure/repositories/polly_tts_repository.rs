use super::tts_repository::TtsRepository;
use crate::domain::video::{UpstreamError, VideoGenerationError};
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// AWS Polly has a limit of 3000 characters per request
const MAX_BATCH_SIZE: usize = 3000;

const SERVICE: &str = "AWS Polly";
const OPERATION: &str = "speech synthesis";

fn sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"([.!?]+\s+)").expect("sentence pattern is valid"))
}

/// Split text into batches that respect sentence boundaries
/// Each batch is at most `max_size` bytes
fn split_into_batches(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }

    let mut batches = Vec::new();
    let mut current_batch = String::new();
    let mut last_end = 0;

    for mat in sentence_pattern().find_iter(text) {
        append_sentence(
            &text[last_end..mat.end()],
            max_size,
            &mut batches,
            &mut current_batch,
        );
        last_end = mat.end();
    }

    // Handle remaining text after last sentence boundary
    if last_end < text.len() {
        append_sentence(
            &text[last_end..],
            max_size,
            &mut batches,
            &mut current_batch,
        );
    }

    flush_batch(&mut batches, &mut current_batch);

    batches
}

fn append_sentence(
    sentence: &str,
    max_size: usize,
    batches: &mut Vec<String>,
    current_batch: &mut String,
) {
    if !current_batch.is_empty() && current_batch.len() + sentence.len() > max_size {
        flush_batch(batches, current_batch);
    }

    if sentence.len() <= max_size {
        current_batch.push_str(sentence);
        return;
    }

    // Run-on sentence: split between words, and inside a word only when it
    // is longer than a batch on its own
    for word in sentence.split_inclusive(char::is_whitespace) {
        if current_batch.len() + word.len() > max_size {
            flush_batch(batches, current_batch);
        }

        if word.len() <= max_size {
            current_batch.push_str(word);
            continue;
        }

        for c in word.chars() {
            if current_batch.len() + c.len_utf8() > max_size {
                flush_batch(batches, current_batch);
            }
            current_batch.push(c);
        }
    }
}

fn flush_batch(batches: &mut Vec<String>, current_batch: &mut String) {
    let batch = current_batch.trim();
    if !batch.is_empty() {
        batches.push(batch.to_string());
    }
    current_batch.clear();
}

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
    voice_id: String,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>, voice_id: String) -> Self {
        Self {
            polly_client,
            voice_id,
        }
    }

    /// Call AWS Polly to synthesize a single text batch
    async fn call_polly(&self, text: &str) -> Result<Vec<u8>, UpstreamError> {
        let voice_id = VoiceId::from(self.voice_id.as_str());
        let engine = Engine::Neural;

        tracing::info!(
            voice = %self.voice_id,
            engine = ?engine,
            output_format = "Mp3",
            text_length = text.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    voice = %self.voice_id,
                    text_length = text.len(),
                    "AWS Polly synthesize_speech failed"
                );
                UpstreamError::Transport {
                    service: SERVICE,
                    operation: OPERATION,
                    message: format!("{}", e),
                }
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            UpstreamError::Malformed {
                service: SERVICE,
                operation: OPERATION,
                message: e.to_string(),
            }
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();
        tracing::debug!(
            audio_size = audio_bytes.len(),
            "Audio stream collected successfully"
        );

        Ok(audio_bytes)
    }

    /// Synthesize multiple text batches and merge the audio results in order
    async fn synthesize_batches(&self, batches: &[String]) -> Result<Vec<u8>, UpstreamError> {
        let mut merged_audio = Vec::new();

        for (index, batch) in batches.iter().enumerate() {
            let audio_data = self.call_polly(batch).await?;
            merged_audio.extend(audio_data);

            tracing::debug!(
                batch_index = index,
                total_audio_size = merged_audio.len(),
                "Batch synthesized and merged"
            );
        }

        Ok(merged_audio)
    }
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VideoGenerationError> {
        if text.trim().is_empty() {
            return Err(VideoGenerationError::AudioSynthesis(UpstreamError::Malformed {
                service: SERVICE,
                operation: OPERATION,
                message: "script is empty".to_string(),
            }));
        }

        let start_time = std::time::Instant::now();

        let batches = split_into_batches(text, MAX_BATCH_SIZE);
        tracing::info!(
            batch_count = batches.len(),
            text_length = text.len(),
            "Text split into batches"
        );

        let audio_data = self
            .synthesize_batches(&batches)
            .await
            .map_err(VideoGenerationError::AudioSynthesis)?;

        let duration = start_time.elapsed();
        tracing::info!(
            provider = "polly",
            voice = %self.voice_id,
            latency_ms = duration.as_millis(),
            characters_count = text.len(),
            batch_count = batches.len(),
            audio_size_bytes = audio_data.len(),
            "TTS synthesis completed"
        );

        Ok(audio_data)
    }
}
