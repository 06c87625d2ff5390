use serde::Deserialize;
use std::env;
use std::time::Duration;

const DEFAULT_AVATAR_IMAGE_URL: &str = "https://firebasestorage.googleapis.com/v0/b/myspiritualpowers-6cc8d.appspot.com/o/reference_faces%2F1.png?alt=media";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub aws_region: String,
    pub log_format: LogFormat,
    // Speech synthesis
    pub tts_provider: TtsProvider,
    pub elevenlabs_api_key: String,
    pub elevenlabs_base_url: String,
    pub elevenlabs_voice_id: String,
    pub elevenlabs_model_id: String,
    pub polly_voice_id: String,
    // Avatar video synthesis
    pub hedra_api_key: String,
    pub hedra_base_url: String,
    pub avatar_image_url: String,
    pub video_aspect_ratio: String,
    // Object storage
    pub storage_bucket: String,
    pub storage_endpoint: Option<String>,
    // Pipeline budget
    pub pipeline_timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub poll_safety_margin: u32,
    pub http_request_timeout_secs: u64,
    pub audio_url_ttl_on_demand_secs: u64,
    pub artifact_url_ttl_secs: u64,
    // Reactive trigger
    pub reactive_trigger_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    ElevenLabs,
    Polly,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let tts_provider = match env::var("TTS_PROVIDER")
            .unwrap_or_else(|_| "elevenlabs".to_string())
            .to_lowercase()
            .as_str()
        {
            "polly" => TtsProvider::Polly,
            _ => TtsProvider::ElevenLabs,
        };

        // The ElevenLabs key is only mandatory when ElevenLabs does the synthesis
        let elevenlabs_api_key = match tts_provider {
            TtsProvider::ElevenLabs => env::var("ELEVENLABS_API_KEY")?,
            TtsProvider::Polly => env::var("ELEVENLABS_API_KEY").unwrap_or_default(),
        };

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            tts_provider,
            elevenlabs_api_key,
            elevenlabs_base_url: env::var("ELEVENLABS_BASE_URL")
                .unwrap_or_else(|_| "https://api.elevenlabs.io".to_string()),
            elevenlabs_voice_id: env::var("ELEVENLABS_VOICE_ID")
                .unwrap_or_else(|_| "cgSgspJ2msm6clMCkdW9".to_string()),
            elevenlabs_model_id: env::var("ELEVENLABS_MODEL_ID")
                .unwrap_or_else(|_| "eleven_flash_v2_5".to_string()),
            polly_voice_id: env::var("POLLY_VOICE_ID").unwrap_or_else(|_| "Joanna".to_string()),
            hedra_api_key: env::var("HEDRA_API_KEY")?,
            hedra_base_url: env::var("HEDRA_BASE_URL")
                .unwrap_or_else(|_| "https://mercury.dev.dream-ai.com/api".to_string()),
            avatar_image_url: env::var("AVATAR_IMAGE_URL")
                .unwrap_or_else(|_| DEFAULT_AVATAR_IMAGE_URL.to_string()),
            video_aspect_ratio: env::var("VIDEO_ASPECT_RATIO")
                .unwrap_or_else(|_| "16:9".to_string()),
            storage_bucket: env::var("STORAGE_BUCKET")?,
            storage_endpoint: env::var("STORAGE_ENDPOINT").ok().filter(|s| !s.is_empty()),
            pipeline_timeout_secs: env::var("PIPELINE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "540".to_string())
                .parse()?,
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            poll_safety_margin: env::var("POLL_SAFETY_MARGIN")
                .unwrap_or_else(|_| "6".to_string())
                .parse()?,
            http_request_timeout_secs: env::var("HTTP_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            audio_url_ttl_on_demand_secs: env::var("AUDIO_URL_TTL_ON_DEMAND_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()?,
            artifact_url_ttl_secs: env::var("ARTIFACT_URL_TTL_SECS")
                .unwrap_or_else(|_| "604800".to_string())
                .parse()?,
            reactive_trigger_enabled: env::var("REACTIVE_TRIGGER_ENABLED")
                .map(|s| s.to_lowercase() != "false")
                .unwrap_or(true),
        };

        Ok(config)
    }

    pub fn pipeline_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn http_request_timeout(&self) -> Duration {
        Duration::from_secs(self.http_request_timeout_secs)
    }

    /// Number of job status checks that fit in the function budget, leaving
    /// `poll_safety_margin` intervals for synthesis, uploads and the download.
    /// Never less than one.
    pub fn poll_max_attempts(&self) -> u32 {
        let fitting = if self.poll_interval_secs == 0 {
            0
        } else {
            (self.pipeline_timeout_secs / self.poll_interval_secs) as u32
        };
        fitting.saturating_sub(self.poll_safety_margin).max(1)
    }
}
