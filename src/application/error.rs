//! Application Error - 应用层统一错误

use thiserror::Error;

use crate::application::ports::{ArtifactError, CacheError, PostError, TtsError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("TTS engine error: {0}")]
    Tts(#[from] TtsError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Audio post error: {0}")]
    Post(#[from] PostError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ArtifactError> for ApplicationError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::NotFound(what) => ApplicationError::NotFound(what),
            other => ApplicationError::Storage(other.to_string()),
        }
    }
}
