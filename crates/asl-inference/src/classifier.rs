//! ONNX Runtime wrapper for the pretrained 8-class sign classifier.
//!
//! The classifier is an external collaborator: it consumes the 400x400x3
//! skeleton canvas and produces a probability vector over 8 coarse classes.
//! Softmax is part of the model graph.

use std::path::Path;
use std::sync::Mutex;

use image::RgbImage;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;

use crate::error::{InferenceError, InferenceResult};

/// Number of coarse classes produced by the classifier.
pub const COARSE_CLASSES: usize = 8;

/// Canvas edge length required by the model.
const INPUT_SIZE: u32 = 400;

/// Trait for the coarse sign classifier.
pub trait SignModel: Send + Sync {
    fn predict(&self, canvas: &RgbImage) -> InferenceResult<[f32; COARSE_CLASSES]>;
}

/// ONNX Runtime-backed sign classifier.
pub struct OrtSignModel {
    session: Mutex<Session>,
}

impl OrtSignModel {
    /// Load the classifier from disk. Fails eagerly so a missing or corrupt
    /// model surfaces at startup, not on the first request.
    pub fn load(model_path: &Path) -> InferenceResult<Self> {
        if !model_path.exists() {
            return Err(InferenceError::ModelNotFound(model_path.to_path_buf()));
        }

        let model_bytes = std::fs::read(model_path)?;

        let session = Session::builder()
            .map_err(|e| InferenceError::session(format!("ORT session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::session(format!("ORT opt level: {e}")))?
            .commit_from_memory(model_bytes.as_slice())
            .map_err(|e| InferenceError::session(format!("ORT load model: {e}")))?;

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl SignModel for OrtSignModel {
    fn predict(&self, canvas: &RgbImage) -> InferenceResult<[f32; COARSE_CLASSES]> {
        let (shape, data) = canvas_to_buffer(canvas)?;
        let tensor = Tensor::from_array((shape, data.into_boxed_slice()))
            .map_err(|e| InferenceError::session(format!("ORT tensor: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::session("ORT session poisoned"))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| InferenceError::session(format!("ORT run failed: {e}")))?;

        if outputs.len() == 0 {
            return Err(InferenceError::invalid_output("model returned no outputs"));
        }

        let (_, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::invalid_output(format!("ORT extract: {e}")))?;

        if data.len() < COARSE_CLASSES {
            return Err(InferenceError::invalid_output(format!(
                "classifier output carries {} values, need {}",
                data.len(),
                COARSE_CLASSES
            )));
        }

        let mut probs = [0f32; COARSE_CLASSES];
        probs.copy_from_slice(&data[..COARSE_CLASSES]);
        Ok(probs)
    }
}

/// Assemble the NHWC `[1, 400, 400, 3]` buffer. The model was trained on
/// raw 0-255 pixel values, so no scaling is applied.
fn canvas_to_buffer(canvas: &RgbImage) -> InferenceResult<(Vec<usize>, Vec<f32>)> {
    let (width, height) = canvas.dimensions();
    if width != INPUT_SIZE || height != INPUT_SIZE {
        return Err(InferenceError::BadCanvasSize { width, height });
    }

    let size = INPUT_SIZE as usize;
    let mut data = Vec::with_capacity(size * size * 3);
    for y in 0..INPUT_SIZE {
        for x in 0..INPUT_SIZE {
            let px = canvas.get_pixel(x, y).0;
            data.push(px[0] as f32);
            data.push(px[1] as f32);
            data.push(px[2] as f32);
        }
    }

    Ok((vec![1, size, size, 3], data))
}
