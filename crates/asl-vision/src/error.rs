//! Error types for vision operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur during landmark extraction and skeleton rendering.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Hand landmark model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Inference session error: {0}")]
    Session(String),

    #[error("Unexpected model output: {0}")]
    InvalidOutput(String),

    #[error("Insufficient landmarks: got {got}, need 21")]
    InsufficientLandmarks { got: usize },

    #[error("Hand region is empty after clamping to frame bounds")]
    EmptyCropRegion,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VisionError {
    /// Create a session error.
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session(message.into())
    }

    /// Create an invalid-output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }

    /// Whether this error means "no usable hand" rather than a fault in the
    /// pipeline itself. Callers map these to a client-visible detection miss.
    pub fn is_detection_miss(&self) -> bool {
        matches!(
            self,
            VisionError::InsufficientLandmarks { .. } | VisionError::EmptyCropRegion
        )
    }
}
