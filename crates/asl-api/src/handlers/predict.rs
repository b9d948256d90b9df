//! Sign prediction handler.
//!
//! Pipeline per request: decode base64 -> decode image -> detect hand ->
//! render skeleton -> classify canvas -> refine with the geometric cascade
//! -> apply the confidence floor -> respond.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use asl_inference::{refine, SignModel, CONFIDENCE_FLOOR};
use asl_vision::HandLandmarker;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Prediction request body.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Base64-encoded photo, optionally with a data-URL prefix.
    #[serde(default)]
    pub image: Option<String>,
}

/// Prediction response body.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub status: String,
    pub prediction: String,
    pub confidence: f32,
}

/// Predict the sign shown in the submitted photo.
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<Json<PredictResponse>> {
    let encoded = request
        .image
        .ok_or_else(|| ApiError::bad_request("No image data received"))?;

    let bytes = decode_image_field(&encoded)?;
    let frame = image::load_from_memory(&bytes)
        .map_err(|e| ApiError::bad_request(format!("Undecodable image: {e}")))?
        .to_rgb8();

    let landmarker = Arc::clone(&state.landmarker);
    let sign_model = Arc::clone(&state.sign_model);

    let start = Instant::now();
    let prediction = tokio::task::spawn_blocking(move || {
        classify_frame(landmarker.as_ref(), sign_model.as_ref(), &frame)
    })
    .await
    .map_err(|e| ApiError::internal(format!("Inference task failed: {e}")))?
    .inspect_err(|e| warn!("Prediction failed: {e}"))?;

    metrics::record_prediction(&prediction.label, start.elapsed().as_secs_f64());
    debug!(
        label = %prediction.label,
        confidence = prediction.confidence,
        "Prediction complete"
    );

    Ok(Json(PredictResponse {
        status: "success".to_string(),
        prediction: prediction.label,
        confidence: prediction.confidence,
    }))
}

struct Prediction {
    label: String,
    confidence: f32,
}

/// Run the blocking part of the pipeline: detection, rendering,
/// classification, and refinement.
fn classify_frame(
    landmarker: &dyn HandLandmarker,
    sign_model: &dyn SignModel,
    frame: &RgbImage,
) -> Result<Prediction, ApiError> {
    let (frame_width, frame_height) = frame.dimensions();

    let hand = landmarker
        .detect(frame)?
        .ok_or(ApiError::NoHandDetected)?;

    // A detection miss inside the renderer (too few landmarks, hand fully
    // outside the frame) reads the same as no hand to the client.
    let skeleton = asl_vision::render(&hand, frame_width, frame_height).map_err(|e| {
        if e.is_detection_miss() {
            ApiError::NoHandDetected
        } else {
            ApiError::Vision(e)
        }
    })?;

    let probs = sign_model.predict(&skeleton.canvas)?;
    let letter = refine(&probs, &skeleton.points)?;

    let confidence = probs.iter().copied().fold(0.0f32, f32::max);
    let label = if confidence < CONFIDENCE_FLOOR {
        "Uncertain".to_string()
    } else {
        letter.to_string()
    };

    Ok(Prediction { label, confidence })
}

/// Decode the base64 image field, tolerating a `data:image/...;base64,`
/// prefix.
fn decode_image_field(encoded: &str) -> ApiResult<Vec<u8>> {
    let payload = match encoded.split_once("base64,") {
        Some((_, rest)) => rest,
        None => encoded,
    };

    BASE64
        .decode(payload.trim())
        .map_err(|e| ApiError::bad_request(format!("Invalid base64 image data: {e}")))
}
