use crate::domain::video::VideoGenerationError;
use async_trait::async_trait;

/// Repository for TTS synthesis operations.
/// Abstracts the underlying TTS provider (ElevenLabs, AWS Polly)
///
/// Implementations are responsible for:
/// - Using one fixed voice/model configuration
/// - Assembling the complete audio buffer (never partial audio)
/// - Reporting every failure as `VideoGenerationError::AudioSynthesis`
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize a narration script to MP3 audio
    ///
    /// # Errors
    /// Returns `AudioSynthesis` if the provider is unreachable, answers with a
    /// non-2xx status or the audio stream breaks. No retry is attempted.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VideoGenerationError>;
}
