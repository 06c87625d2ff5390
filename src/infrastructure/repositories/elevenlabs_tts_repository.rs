use super::tts_repository::TtsRepository;
use crate::domain::video::{UpstreamError, VideoGenerationError};
use crate::infrastructure::config::Config;
use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use std::time::Duration;

const SERVICE: &str = "ElevenLabs";
const OPERATION: &str = "speech synthesis";
const XI_API_KEY_HEADER: &str = "xi-api-key";

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs implementation of TTS repository
pub struct ElevenLabsTtsRepository {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsTtsRepository {
    pub fn new(
        base_url: String,
        api_key: String,
        voice_id: String,
        model_id: String,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(request_timeout).build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            voice_id,
            model_id,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Self::new(
            config.elevenlabs_base_url.clone(),
            config.elevenlabs_api_key.clone(),
            config.elevenlabs_voice_id.clone(),
            config.elevenlabs_model_id.clone(),
            config.http_request_timeout(),
        )
    }

    fn stream_url(&self) -> String {
        format!("{}/v1/text-to-speech/{}/stream", self.base_url, self.voice_id)
    }

    async fn call_elevenlabs(&self, text: &str) -> Result<Vec<u8>, UpstreamError> {
        tracing::info!(
            voice = %self.voice_id,
            model = %self.model_id,
            text_length = text.len(),
            "Calling ElevenLabs streaming TTS API"
        );

        let response = self
            .http_client
            .post(self.stream_url())
            .header(XI_API_KEY_HEADER, &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&SpeechRequest {
                text,
                model_id: &self.model_id,
            })
            .send()
            .await
            .map_err(|e| UpstreamError::Transport {
                service: SERVICE,
                operation: OPERATION,
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(UpstreamError::Status {
                service: SERVICE,
                operation: OPERATION,
                status,
                body,
            });
        }

        let mut stream = response.bytes_stream();
        let mut audio = Vec::new();
        let mut chunk_count = 0usize;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| UpstreamError::Malformed {
                service: SERVICE,
                operation: OPERATION,
                message: format!("audio stream interrupted after {} bytes: {}", audio.len(), e),
            })?;
            chunk_count += 1;
            audio.extend_from_slice(&bytes);
        }

        if audio.is_empty() {
            return Err(UpstreamError::Malformed {
                service: SERVICE,
                operation: OPERATION,
                message: "audio stream was empty".to_string(),
            });
        }

        tracing::debug!(
            chunk_count = chunk_count,
            audio_size = audio.len(),
            "ElevenLabs audio stream collected"
        );

        Ok(audio)
    }
}

#[async_trait]
impl TtsRepository for ElevenLabsTtsRepository {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VideoGenerationError> {
        if text.trim().is_empty() {
            return Err(VideoGenerationError::AudioSynthesis(UpstreamError::Malformed {
                service: SERVICE,
                operation: OPERATION,
                message: "script is empty".to_string(),
            }));
        }

        let start_time = std::time::Instant::now();

        let audio_data = self.call_elevenlabs(text).await.map_err(|e| {
            tracing::error!(
                error = %e,
                voice = %self.voice_id,
                text_length = text.len(),
                "ElevenLabs TTS call failed"
            );
            VideoGenerationError::AudioSynthesis(e)
        })?;

        let duration = start_time.elapsed();
        tracing::info!(
            provider = "elevenlabs",
            model = %self.model_id,
            voice = %self.voice_id,
            latency_ms = duration.as_millis(),
            characters_count = text.len(),
            audio_size_bytes = audio_data.len(),
            "TTS synthesis completed"
        );

        Ok(audio_data)
    }
}
