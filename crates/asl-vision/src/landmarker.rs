//! MediaPipe-style hand landmark extraction via ONNX Runtime.
//!
//! The landmark model is an external collaborator: it consumes a square
//! RGB crop and produces 21 (x, y, z) coordinates in input space plus a
//! hand-presence score and a handedness score. Everything downstream only
//! depends on the [`HandLandmarker`] trait.

use std::path::Path;
use std::sync::Mutex;

use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use tracing::debug;

use asl_models::{HandDetection, Point, LANDMARK_COUNT};

use crate::error::{VisionError, VisionResult};

/// Square input edge expected by the landmark model.
const INPUT_SIZE: u32 = 224;

/// Hand-presence score below which a frame is treated as empty.
const PRESENCE_THRESHOLD: f32 = 0.5;

/// Trait for locating a single hand in a frame.
///
/// At most one hand is reported; `Ok(None)` means no hand was found.
pub trait HandLandmarker: Send + Sync {
    fn detect(&self, frame: &RgbImage) -> VisionResult<Option<HandDetection>>;
}

/// ONNX Runtime-backed hand landmarker.
pub struct OrtHandLandmarker {
    session: Mutex<Session>,
}

impl OrtHandLandmarker {
    /// Load the landmark model from disk. Fails eagerly so a missing or
    /// corrupt model surfaces at startup, not on the first request.
    pub fn load(model_path: &Path) -> VisionResult<Self> {
        if !model_path.exists() {
            return Err(VisionError::ModelNotFound(model_path.to_path_buf()));
        }

        let model_bytes = std::fs::read(model_path)?;

        let session = Session::builder()
            .map_err(|e| VisionError::session(format!("ORT session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| VisionError::session(format!("ORT opt level: {e}")))?
            .commit_from_memory(model_bytes.as_slice())
            .map_err(|e| VisionError::session(format!("ORT load model: {e}")))?;

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl HandLandmarker for OrtHandLandmarker {
    fn detect(&self, frame: &RgbImage) -> VisionResult<Option<HandDetection>> {
        let (tensor, letterbox) = prepare_frame(frame)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| VisionError::session("ORT session poisoned"))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| VisionError::session(format!("ORT run failed: {e}")))?;

        if outputs.len() < 2 {
            return Err(VisionError::invalid_output(
                "landmark model returned fewer than 2 outputs",
            ));
        }

        let presence = scalar_output(&outputs[1])?;
        if presence < PRESENCE_THRESHOLD {
            debug!(presence, "no hand: presence below threshold");
            return Ok(None);
        }

        let raw = landmark_output(&outputs[0])?;
        let points = project_landmarks(&raw, &letterbox);

        match HandDetection::from_points(points) {
            Some(hand) => Ok(Some(hand)),
            None => Ok(None),
        }
    }
}

/// Letterbox transform parameters mapping model input space back to the
/// source frame.
struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
    frame_w: u32,
    frame_h: u32,
}

/// Letterbox the frame into the model's square input and build the NHWC
/// tensor, pixels scaled to [0, 1].
fn prepare_frame(frame: &RgbImage) -> VisionResult<(Tensor<f32>, Letterbox)> {
    let (frame_w, frame_h) = frame.dimensions();
    if frame_w == 0 || frame_h == 0 {
        return Err(VisionError::invalid_output("empty input frame"));
    }

    let scale = INPUT_SIZE as f32 / frame_w.max(frame_h) as f32;
    let new_w = ((frame_w as f32 * scale).round().max(1.0)) as u32;
    let new_h = ((frame_h as f32 * scale).round().max(1.0)) as u32;
    let resized = image::imageops::resize(frame, new_w, new_h, FilterType::CatmullRom);

    let pad_x = ((INPUT_SIZE as i64 - new_w as i64) / 2).max(0) as u32;
    let pad_y = ((INPUT_SIZE as i64 - new_h as i64) / 2).max(0) as u32;

    let mut letterboxed = RgbImage::from_pixel(INPUT_SIZE, INPUT_SIZE, Rgb([0, 0, 0]));
    for y in 0..new_h {
        for x in 0..new_w {
            let lx = x + pad_x;
            let ly = y + pad_y;
            if lx < INPUT_SIZE && ly < INPUT_SIZE {
                letterboxed.put_pixel(lx, ly, *resized.get_pixel(x, y));
            }
        }
    }

    let size = INPUT_SIZE as usize;
    let mut data = Vec::with_capacity(size * size * 3);
    for y in 0..INPUT_SIZE {
        for x in 0..INPUT_SIZE {
            let px = letterboxed.get_pixel(x, y).0;
            data.push(px[0] as f32 / 255.0);
            data.push(px[1] as f32 / 255.0);
            data.push(px[2] as f32 / 255.0);
        }
    }

    let shape = vec![1usize, size, size, 3];
    let tensor = Tensor::from_array((shape, data.into_boxed_slice()))
        .map_err(|e| VisionError::session(format!("ORT tensor: {e}")))?;

    Ok((
        tensor,
        Letterbox {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
            frame_w,
            frame_h,
        },
    ))
}

/// Extract the 21 (x, y, z) coordinates from the first model output.
fn landmark_output(output: &ort::value::Value) -> VisionResult<Vec<[f32; 3]>> {
    let (_, data) = output
        .try_extract_tensor::<f32>()
        .map_err(|e| VisionError::invalid_output(format!("ORT extract: {e}")))?;

    if data.len() < LANDMARK_COUNT * 3 {
        return Err(VisionError::invalid_output(format!(
            "landmark output carries {} values, need {}",
            data.len(),
            LANDMARK_COUNT * 3
        )));
    }

    Ok(data
        .chunks_exact(3)
        .take(LANDMARK_COUNT)
        .map(|c| [c[0], c[1], c[2]])
        .collect())
}

/// Extract a single scalar from a model output.
fn scalar_output(output: &ort::value::Value) -> VisionResult<f32> {
    let (_, data) = output
        .try_extract_tensor::<f32>()
        .map_err(|e| VisionError::invalid_output(format!("ORT extract: {e}")))?;

    data.first()
        .copied()
        .ok_or_else(|| VisionError::invalid_output("empty scalar output"))
}

/// Undo the letterbox transform, yielding full-frame integer coordinates.
fn project_landmarks(raw: &[[f32; 3]], letterbox: &Letterbox) -> Vec<Point> {
    raw.iter()
        .map(|[x, y, _z]| {
            let px = (x - letterbox.pad_x) / letterbox.scale;
            let py = (y - letterbox.pad_y) / letterbox.scale;
            let cx = px.clamp(0.0, letterbox.frame_w.saturating_sub(1) as f32);
            let cy = py.clamp(0.0, letterbox.frame_h.saturating_sub(1) as f32);
            Point::new(cx.round() as i32, cy.round() as i32)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_landmarks_round_trip() {
        // A 448x224 frame letterboxes to scale 0.5 with vertical padding.
        let letterbox = Letterbox {
            scale: 0.5,
            pad_x: 0.0,
            pad_y: 56.0,
            frame_w: 448,
            frame_h: 224,
        };
        let raw = [[100.0, 106.0, 0.0]];
        let points = project_landmarks(&raw, &letterbox);
        assert_eq!(points, vec![Point::new(200, 100)]);
    }

    #[test]
    fn test_project_landmarks_clamps_to_frame() {
        let letterbox = Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
            frame_w: 100,
            frame_h: 100,
        };
        let raw = [[-5.0, 250.0, 0.0]];
        let points = project_landmarks(&raw, &letterbox);
        assert_eq!(points, vec![Point::new(0, 99)]);
    }
}
