pub mod avatar_video_repository;
pub mod elevenlabs_tts_repository;
pub mod hedra_video_repository;
pub mod object_store_repository;
pub mod polly_tts_repository;
pub mod quiz_result_repository;
pub mod s3_object_store_repository;
pub mod tts_repository;
pub mod video_generation_repository;

pub use avatar_video_repository::{AvatarVideoRepository, Sleeper, TokioSleeper};
pub use elevenlabs_tts_repository::ElevenLabsTtsRepository;
pub use hedra_video_repository::{HedraSettings, HedraVideoRepository};
pub use object_store_repository::ObjectStoreRepository;
pub use polly_tts_repository::PollyTtsRepository;
pub use quiz_result_repository::{PgQuizResultRepository, QuizResultRepository};
pub use s3_object_store_repository::S3ObjectStoreRepository;
pub use tts_repository::TtsRepository;
pub use video_generation_repository::{PgVideoGenerationRepository, VideoGenerationRepository};
