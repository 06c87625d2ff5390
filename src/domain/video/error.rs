use crate::error::AppError;

/// Failure talking to a third-party API
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpstreamError {
    #[error("{service} {operation} failed with status {status}: {body}")]
    Status {
        service: &'static str,
        operation: &'static str,
        status: u16,
        body: String,
    },
    #[error("{service} {operation} request failed: {message}")]
    Transport {
        service: &'static str,
        operation: &'static str,
        message: String,
    },
    #[error("{service} {operation} returned an unreadable response: {message}")]
    Malformed {
        service: &'static str,
        operation: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoGenerationErrorKind {
    Upstream,
    Timeout,
    JobFailed,
    DataNotFound,
    Auth,
    Storage,
    Dependency,
}

#[derive(Debug, thiserror::Error)]
pub enum VideoGenerationError {
    #[error("audio synthesis failed: {0}")]
    AudioSynthesis(#[source] UpstreamError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("{0}")]
    Timeout(String),
    #[error("{0}")]
    JobFailed(String),
    #[error("{0}")]
    DataNotFound(String),
    #[error("{0}")]
    Auth(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("dependency error: {0}")]
    Dependency(String),
}

impl VideoGenerationError {
    pub fn kind(&self) -> VideoGenerationErrorKind {
        match self {
            Self::AudioSynthesis(_) | Self::Upstream(_) => VideoGenerationErrorKind::Upstream,
            Self::Timeout(_) => VideoGenerationErrorKind::Timeout,
            Self::JobFailed(_) => VideoGenerationErrorKind::JobFailed,
            Self::DataNotFound(_) => VideoGenerationErrorKind::DataNotFound,
            Self::Auth(_) => VideoGenerationErrorKind::Auth,
            Self::Storage(_) => VideoGenerationErrorKind::Storage,
            Self::Dependency(_) => VideoGenerationErrorKind::Dependency,
        }
    }
}

impl From<AppError> for VideoGenerationError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Unauthorized(msg) => VideoGenerationError::Auth(msg),
            AppError::NotFound(msg) => VideoGenerationError::DataNotFound(msg),
            _ => VideoGenerationError::Dependency(err.to_string()),
        }
    }
}

impl From<VideoGenerationError> for AppError {
    fn from(err: VideoGenerationError) -> Self {
        match err.kind() {
            VideoGenerationErrorKind::Upstream
            | VideoGenerationErrorKind::Timeout
            | VideoGenerationErrorKind::JobFailed => AppError::BadGateway(err.to_string()),
            VideoGenerationErrorKind::DataNotFound => AppError::NotFound(err.to_string()),
            VideoGenerationErrorKind::Auth => AppError::Unauthorized(err.to_string()),
            VideoGenerationErrorKind::Storage => AppError::ExternalService(err.to_string()),
            VideoGenerationErrorKind::Dependency => AppError::Internal(err.to_string()),
        }
    }
}
