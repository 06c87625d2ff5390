use quizvid_backend::domain::auth::JwtManager;
use quizvid_backend::domain::video::{PipelineSettings, QuizResultHandler, VideoGenerationService};
use quizvid_backend::infrastructure::config::{Config, LogFormat, TtsProvider};
use quizvid_backend::infrastructure::db::{check_connection, create_pool, run_migrations};
use quizvid_backend::infrastructure::http::{build_router, start_http_server};
use quizvid_backend::infrastructure::repositories::{
    AvatarVideoRepository, ElevenLabsTtsRepository, HedraSettings, HedraVideoRepository,
    ObjectStoreRepository, PgQuizResultRepository, PgVideoGenerationRepository,
    PollyTtsRepository, QuizResultRepository, S3ObjectStoreRepository, TokioSleeper,
    TtsRepository, VideoGenerationRepository,
};
use quizvid_backend::infrastructure::triggers::QuizResultListener;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting quiz video backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection
    check_connection(&pool).await?;
    tracing::info!("Database connection verified");

    run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    // AWS config shared by S3 and Polly
    tracing::info!("Loading AWS configuration with region: {}", config.aws_region);

    let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
    let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
    if !has_access_key || !has_secret_key {
        tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
    }

    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;

    tracing::info!(
        region = ?aws_config.region(),
        "AWS configuration loaded"
    );

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories
    tracing::info!("Instantiating repositories...");
    let video_repo: Arc<dyn VideoGenerationRepository> =
        Arc::new(PgVideoGenerationRepository::new(pool.clone()));
    let quiz_repo: Arc<dyn QuizResultRepository> =
        Arc::new(PgQuizResultRepository::new(pool.clone()));

    let tts_repo: Arc<dyn TtsRepository> = match config.tts_provider {
        TtsProvider::ElevenLabs => {
            tracing::info!(voice = %config.elevenlabs_voice_id, model = %config.elevenlabs_model_id, "Using ElevenLabs for speech synthesis");
            Arc::new(ElevenLabsTtsRepository::from_config(&config)?)
        }
        TtsProvider::Polly => {
            tracing::info!(voice = %config.polly_voice_id, "Using AWS Polly for speech synthesis");
            let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
            Arc::new(PollyTtsRepository::new(
                polly_client,
                config.polly_voice_id.clone(),
            ))
        }
    };

    let object_store: Arc<dyn ObjectStoreRepository> =
        Arc::new(S3ObjectStoreRepository::from_sdk_config(
            &aws_config,
            config.storage_bucket.clone(),
            config.storage_endpoint.as_deref(),
        ));

    let hedra_settings = HedraSettings::from(config.as_ref());
    tracing::info!(
        poll_interval_secs = hedra_settings.poll_interval.as_secs(),
        max_attempts = hedra_settings.max_attempts,
        "Avatar video polling budget"
    );
    let avatar_repo: Arc<dyn AvatarVideoRepository> = Arc::new(HedraVideoRepository::new(
        hedra_settings,
        Arc::new(TokioSleeper),
    )?);

    // 2. Instantiate services
    tracing::info!("Instantiating services...");
    let video_service = Arc::new(VideoGenerationService::new(
        video_repo.clone(),
        quiz_repo.clone(),
        tts_repo,
        object_store,
        avatar_repo,
        PipelineSettings::from(config.as_ref()),
    ));

    // 3. Reactive trigger
    if config.reactive_trigger_enabled {
        let handler: Arc<dyn QuizResultHandler> = video_service.clone();
        let listener = QuizResultListener::new(pool.clone(), quiz_repo, handler);
        tokio::spawn(async move {
            if let Err(e) = listener.run().await {
                tracing::error!(error = ?e, "Quiz results listener stopped");
            }
        });
    } else {
        tracing::info!("Reactive video generation disabled");
    }

    // 4. Instantiate controllers
    tracing::info!("Instantiating controllers...");
    let video_controller = Arc::new(quizvid_backend::controllers::video::VideoController::new(
        video_service,
    ));
    let jwt_manager = Arc::new(JwtManager::new(config.jwt_secret.clone()));

    // Start HTTP server with all routes
    let app = build_router(video_controller, video_repo, jwt_manager);
    start_http_server(config, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "quizvid_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "quizvid_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
