//! Error types for classification and refinement.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for inference operations.
pub type InferenceResult<T> = Result<T, InferenceError>;

/// Errors that can occur during classification and refinement.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Sign classifier model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Inference session error: {0}")]
    Session(String),

    #[error("Unexpected model output: {0}")]
    InvalidOutput(String),

    #[error("Insufficient landmarks for refinement: got {got}, need 21")]
    InsufficientLandmarks { got: usize },

    #[error("Hand geometry matched no letter rule for coarse class {bucket}")]
    Unclassified { bucket: usize },

    #[error("Canvas is {width}x{height}, classifier requires 400x400")]
    BadCanvasSize { width: u32, height: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InferenceError {
    /// Create a session error.
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session(message.into())
    }

    /// Create an invalid-output error.
    pub fn invalid_output(message: impl Into<String>) -> Self {
        Self::InvalidOutput(message.into())
    }
}
