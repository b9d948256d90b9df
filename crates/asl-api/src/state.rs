//! Application state.

use std::sync::Arc;

use asl_inference::{OrtSignModel, SignModel};
use asl_vision::{HandLandmarker, OrtHandLandmarker};

use crate::config::ApiConfig;

/// Shared application state.
///
/// The landmarker and classifier are loaded once at startup and shared
/// read-only across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub landmarker: Arc<dyn HandLandmarker>,
    pub sign_model: Arc<dyn SignModel>,
}

impl AppState {
    /// Create new application state, loading both ONNX models. A missing or
    /// unloadable model fails here rather than on the first request.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let landmarker = OrtHandLandmarker::load(&config.hand_model_path)?;
        let sign_model = OrtSignModel::load(&config.sign_model_path)?;

        Ok(Self {
            config,
            landmarker: Arc::new(landmarker),
            sign_model: Arc::new(sign_model),
        })
    }

    /// Build state around pre-constructed components. Used by tests to
    /// substitute stub landmarker/classifier implementations.
    pub fn with_components(
        config: ApiConfig,
        landmarker: Arc<dyn HandLandmarker>,
        sign_model: Arc<dyn SignModel>,
    ) -> Self {
        Self {
            config,
            landmarker,
            sign_model,
        }
    }
}
