use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::domain::auth::JwtManager;
use crate::infrastructure::config::Config;
use crate::infrastructure::repositories::VideoGenerationRepository;
use crate::{
    controllers::{health, video::VideoController},
    infrastructure::auth::{auth_middleware, request_id_middleware},
};

/// Build the application router with all routes configured
pub fn build_router(
    video_controller: Arc<VideoController>,
    video_repo: Arc<dyn VideoGenerationRepository>,
    jwt_manager: Arc<JwtManager>,
) -> Router {
    // Video generation routes (require authentication)
    let video_routes = Router::new()
        .route("/api/video-generations", post(VideoController::generate))
        .route("/api/video-generations/:userId", get(VideoController::get_status))
        .with_state(video_controller)
        .layer(middleware::from_fn_with_state(jwt_manager, auth_middleware));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(video_repo)
        .merge(video_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
