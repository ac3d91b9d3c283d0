//! The crate's public error taxonomy (§4.8, §7): a small `thiserror` enum
//! covering construction and runtime sink failures. Generator and callback
//! faults never reach this type — they are swallowed at the `pull`/invoke
//! boundary and only ever surface as a `tracing::warn!`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("no audio output device available")]
    DeviceUnavailable,

    #[error("failed to build audio stream: {0}")]
    StreamBuildFailed(String),

    #[error("render I/O error: {0}")]
    RenderIoError(#[from] std::io::Error),
}

impl From<cpal::DevicesError> for EngineError {
    fn from(e: cpal::DevicesError) -> Self {
        EngineError::StreamBuildFailed(e.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for EngineError {
    fn from(e: cpal::DefaultStreamConfigError) -> Self {
        EngineError::StreamBuildFailed(e.to_string())
    }
}

impl From<cpal::BuildStreamError> for EngineError {
    fn from(e: cpal::BuildStreamError) -> Self {
        EngineError::StreamBuildFailed(e.to_string())
    }
}

impl From<cpal::PlayStreamError> for EngineError {
    fn from(e: cpal::PlayStreamError) -> Self {
        EngineError::StreamBuildFailed(e.to_string())
    }
}

impl From<hound::Error> for EngineError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => EngineError::RenderIoError(io),
            other => EngineError::RenderIoError(std::io::Error::other(other.to_string())),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
