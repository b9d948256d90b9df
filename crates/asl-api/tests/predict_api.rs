//! API integration tests.
//!
//! The router is driven directly with `tower::ServiceExt::oneshot`; the
//! landmarker and classifier are stubbed so no ONNX models are needed.

use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{Rgb, RgbImage};
use serde_json::{json, Value};
use tower::ServiceExt;

use asl_api::{create_router, ApiConfig, AppState};
use asl_inference::{InferenceResult, SignModel, COARSE_CLASSES};
use asl_models::{HandDetection, Point, LANDMARK_COUNT};
use asl_vision::{HandLandmarker, VisionResult};

struct StubLandmarker(Option<HandDetection>);

impl HandLandmarker for StubLandmarker {
    fn detect(&self, _frame: &RgbImage) -> VisionResult<Option<HandDetection>> {
        Ok(self.0.clone())
    }
}

struct StubModel([f32; COARSE_CLASSES]);

impl SignModel for StubModel {
    fn predict(&self, _canvas: &RgbImage) -> InferenceResult<[f32; COARSE_CLASSES]> {
        Ok(self.0)
    }
}

/// A detection whose geometry resolves coarse pair (2, _) to the letter C:
/// no cascade rule lists (2, 3), and the thumb-to-middle-tip distance
/// exceeds the C/O threshold.
fn c_shaped_hand() -> HandDetection {
    let mut points = vec![Point::new(10, 10); LANDMARK_COUNT];
    points[4] = Point::new(5, 5);
    points[12] = Point::new(60, 5);
    HandDetection::from_points(points).expect("non-empty point set")
}

fn probs(top: usize, top_p: f32, second: usize, second_p: f32) -> [f32; COARSE_CLASSES] {
    let mut probs = [0.0; COARSE_CLASSES];
    probs[top] = top_p;
    probs[second] = second_p;
    probs
}

fn test_app(hand: Option<HandDetection>, model_probs: [f32; COARSE_CLASSES]) -> axum::Router {
    let state = AppState::with_components(
        ApiConfig::default(),
        Arc::new(StubLandmarker(hand)),
        Arc::new(StubModel(model_probs)),
    );
    create_router(state, None)
}

/// A 64x64 white frame as a base64 PNG, matching what a webcam client posts.
fn frame_base64() -> String {
    let frame = RgbImage::from_pixel(64, 64, Rgb([255, 255, 255]));
    let mut bytes = Cursor::new(Vec::new());
    frame
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encode png");
    BASE64.encode(bytes.into_inner())
}

fn predict_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/predict")
        .header("Content-Type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_predict_success() {
    let app = test_app(Some(c_shaped_hand()), probs(2, 0.8, 3, 0.15));

    let body = json!({ "image": frame_base64() }).to_string();
    let response = app.oneshot(predict_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["prediction"], "C");
    assert!((json["confidence"].as_f64().unwrap() - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn test_predict_accepts_data_url_prefix() {
    let app = test_app(Some(c_shaped_hand()), probs(2, 0.8, 3, 0.15));

    let body = json!({ "image": format!("data:image/png;base64,{}", frame_base64()) }).to_string();
    let response = app.oneshot(predict_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["prediction"], "C");
}

#[tokio::test]
async fn test_confidence_floor_is_exclusive_below() {
    // 0.39 falls below the floor and forces "Uncertain".
    let app = test_app(Some(c_shaped_hand()), probs(2, 0.39, 3, 0.1));
    let body = json!({ "image": frame_base64() }).to_string();
    let response = app.oneshot(predict_request(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["prediction"], "Uncertain");

    // Exactly 0.4 keeps the letter.
    let app = test_app(Some(c_shaped_hand()), probs(2, 0.4, 3, 0.1));
    let body = json!({ "image": frame_base64() }).to_string();
    let response = app.oneshot(predict_request(body)).await.unwrap();
    let json = response_json(response).await;
    assert_eq!(json["prediction"], "C");
}

#[tokio::test]
async fn test_predict_missing_image_field() {
    let app = test_app(Some(c_shaped_hand()), probs(2, 0.8, 3, 0.15));

    let response = app
        .oneshot(predict_request(json!({}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("No image data"));
}

#[tokio::test]
async fn test_predict_invalid_base64() {
    let app = test_app(Some(c_shaped_hand()), probs(2, 0.8, 3, 0.15));

    let body = json!({ "image": "!!not-base64!!" }).to_string();
    let response = app.oneshot(predict_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_predict_undecodable_image_bytes() {
    let app = test_app(Some(c_shaped_hand()), probs(2, 0.8, 3, 0.15));

    let body = json!({ "image": BASE64.encode(b"definitely not a png") }).to_string();
    let response = app.oneshot(predict_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_no_hand() {
    let app = test_app(None, probs(2, 0.8, 3, 0.15));

    let body = json!({ "image": frame_base64() }).to_string();
    let response = app.oneshot(predict_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["error"], "No hand detected");
}

#[tokio::test]
async fn test_oversized_body_is_rejected() {
    let app = test_app(Some(c_shaped_hand()), probs(2, 0.8, 3, 0.15));

    // 3MB of padding blows the 2MB cap before any decoding happens.
    let body = format!("{{\"image\": \"{}\"}}", "a".repeat(3 * 1024 * 1024));
    let response = app.oneshot(predict_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = test_app(None, probs(2, 0.8, 3, 0.15));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/predict")
                .header("Origin", "http://localhost:3000")
                .header("Access-Control-Request-Method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::OK || response.status() == StatusCode::NO_CONTENT
    );
    assert!(response
        .headers()
        .contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_capabilities_endpoint() {
    let app = test_app(None, probs(2, 0.8, 3, 0.15));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["service"], "asl-api");
    assert_eq!(json["pipeline"], "skeleton");
    assert_eq!(json["labels"].as_array().unwrap().len(), 24);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app(None, probs(2, 0.8, 3, 0.15));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "healthy");
}
